//! Transpose widgets (§4.7.1 "Transpose"): swap adjacent chars or words.

use super::word;
use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("transpose-chars", transpose_chars);
    t.insert("transpose-words", transpose_words);
}

fn transpose_chars(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    Ok(ok_if(ctx.state.buf.transpose()))
}

/// Swaps the word at or immediately after the cursor with the word before
/// it, leaving the cursor just past the (now second) word.
fn transpose_words(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let buf = &ctx.state.buf;
    let chars = buf.as_slice();
    let len = chars.len();

    let mut w2s = buf.cursor();
    while w2s < len && !word::is_word_char(chars[w2s]) {
        w2s += 1;
    }
    let mut w2e = w2s;
    while w2e < len && word::is_word_char(chars[w2e]) {
        w2e += 1;
    }
    if w2s == w2e {
        return Ok(WidgetOutcome::failure());
    }

    let mut w1e = w2s;
    while w1e > 0 && !word::is_word_char(chars[w1e - 1]) {
        w1e -= 1;
    }
    let w1s = word::backward(buf, w1e);
    if w1s == w1e {
        return Ok(WidgetOutcome::failure());
    }

    let word1 = buf.substring(w1s, w1e);
    let between = buf.substring(w1e, w2s);
    let word2 = buf.substring(w2s, w2e);
    let replacement = format!("{word2}{between}{word1}");

    let buf = &mut ctx.state.buf;
    buf.set_cursor(w2e);
    buf.backspace(w2e - w1s);
    buf.insert(&replacement, false);
    Ok(WidgetOutcome::success())
}

fn ok_if(b: bool) -> WidgetOutcome {
    if b {
        WidgetOutcome::success()
    } else {
        WidgetOutcome::failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Harness;

    #[test]
    fn transpose_chars_swaps_and_advances() {
        let mut h = Harness::new("ab", 1);
        let (mut ctx, mut reader) = h.split();
        transpose_chars(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "ba");
    }

    #[test]
    fn transpose_words_swaps_adjacent_words() {
        let mut h = Harness::new("foo bar", 0);
        let (mut ctx, mut reader) = h.split();
        transpose_words(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "bar foo");
    }

    #[test]
    fn transpose_words_with_only_one_word_fails() {
        let mut h = Harness::new("foo", 0);
        let (mut ctx, mut reader) = h.split();
        let outcome = transpose_words(&mut ctx, &mut reader, 1).unwrap();
        assert!(!outcome.ok);
    }
}

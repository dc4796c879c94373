//! Case-conversion widgets (§4.7.1 "Case"): operate on the next word,
//! leaving the cursor at its end.

use super::word;
use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("capitalize-word", capitalize_word);
    t.insert("upcase-word", upcase_word);
    t.insert("downcase-word", downcase_word);
}

/// The word starting at or after `from`: non-word characters are skipped
/// first, matching `forward-word`'s notion of a word boundary.
fn next_word_span(ctx: &WidgetContext, from: usize) -> (usize, usize) {
    let chars = ctx.state.buf.as_slice();
    let len = chars.len();
    let mut i = from;
    while i < len && !word::is_word_char(chars[i]) {
        i += 1;
    }
    let start = i;
    while i < len && word::is_word_char(chars[i]) {
        i += 1;
    }
    (start, i)
}

fn convert_next_word(ctx: &mut WidgetContext, count: u32, convert: fn(&str) -> String) -> WidgetOutcome {
    let mut changed = false;
    for _ in 0..count.max(1) {
        let (start, end) = next_word_span(ctx, ctx.state.buf.cursor());
        if start == end {
            break;
        }
        let word_text = ctx.state.buf.substring(start, end);
        let converted = convert(&word_text);
        ctx.state.buf.set_cursor(end);
        ctx.state.buf.backspace(end - start);
        ctx.state.buf.insert(&converted, false);
        changed = true;
    }
    if changed {
        WidgetOutcome::success()
    } else {
        WidgetOutcome::failure()
    }
}

fn titlecase(word_text: &str) -> String {
    let mut chars = word_text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn capitalize_word(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    Ok(convert_next_word(ctx, count, titlecase))
}

fn upcase_word(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    Ok(convert_next_word(ctx, count, |s| s.to_uppercase()))
}

fn downcase_word(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    Ok(convert_next_word(ctx, count, |s| s.to_lowercase()))
}

//! `vi-match-bracket` (§4.7.1 "Vi match", `%`): jumps to the bracket that
//! matches the one at or after the cursor. Plain character matching only —
//! no quote- or string-literal-awareness (an open §9 question, decided in
//! DESIGN.md).

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_input::BindingReader;
use std::collections::HashMap;

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("vi-match-bracket", vi_match_bracket);
}

fn vi_match_bracket(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let chars = ctx.state.buf.as_slice();
    let cursor = ctx.state.buf.cursor();
    let Some(start) = (cursor..chars.len()).find(|&i| is_bracket(chars[i])) else {
        return Ok(WidgetOutcome::failure());
    };
    let Some(target) = find_match(chars, start, chars[start]) else {
        return Ok(WidgetOutcome::failure());
    };
    ctx.state.buf.set_cursor(target);
    Ok(WidgetOutcome::success())
}

fn is_bracket(c: char) -> bool {
    PAIRS.iter().any(|&(o, cl)| c == o || c == cl)
}

fn find_match(chars: &[char], start: usize, c: char) -> Option<usize> {
    let (open, close, forward) = PAIRS.iter().find_map(|&(o, cl)| {
        if c == o {
            Some((o, cl, true))
        } else if c == cl {
            Some((o, cl, false))
        } else {
            None
        }
    })?;
    let mut depth = 0i32;
    if forward {
        for i in start..chars.len() {
            if chars[i] == open {
                depth += 1;
            } else if chars[i] == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    } else {
        for i in (0..=start).rev() {
            if chars[i] == close {
                depth += 1;
            } else if chars[i] == open {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Harness;

    #[test]
    fn matches_forward_to_the_closing_bracket() {
        let mut h = Harness::new("foo(bar)baz", 3);
        let (mut ctx, mut reader) = h.split();
        let outcome = vi_match_bracket(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.cursor(), 7);
    }

    #[test]
    fn matches_backward_to_the_opening_bracket() {
        let mut h = Harness::new("foo(bar)baz", 7);
        let (mut ctx, mut reader) = h.split();
        let outcome = vi_match_bracket(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.cursor(), 3);
    }

    #[test]
    fn skips_forward_to_the_nearest_bracket_before_matching() {
        let mut h = Harness::new("x = [1, (2, 3)]", 0);
        let (mut ctx, mut reader) = h.split();
        let outcome = vi_match_bracket(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.cursor(), 14);
    }

    #[test]
    fn no_bracket_on_or_after_the_cursor_fails() {
        let mut h = Harness::new("no brackets here", 0);
        let (mut ctx, mut reader) = h.split();
        let outcome = vi_match_bracket(&mut ctx, &mut reader, 1).unwrap();
        assert!(!outcome.ok);
    }
}

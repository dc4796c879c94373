//! Insertion widgets (§4.7.1 "Insert"): self-insert, quoted-insert, and the
//! close-bracket widgets that blink to their matching opener (§4.7).

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::KeyToken;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("self-insert", self_insert);
    t.insert("quoted-insert", quoted_insert);
    t.insert("insert-close-paren", insert_close_paren);
    t.insert("insert-close-bracket", insert_close_bracket);
    t.insert("insert-close-brace", insert_close_brace);
}

fn self_insert(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let Some(key) = ctx.last_keys.last() else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    let text: String = std::iter::repeat(c).take(count.max(1) as usize).collect();
    ctx.state.buf.insert(&text, false);
    Ok(WidgetOutcome::success())
}

/// Reads the next raw key, bypassing the keymap entirely, and inserts it
/// literally — the escape hatch for binding a key that would otherwise
/// trigger another widget.
fn quoted_insert(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let Some(key) = r.read_raw_key()? else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    let text: String = std::iter::repeat(c).take(count.max(1) as usize).collect();
    ctx.state.buf.insert(&text, false);
    Ok(WidgetOutcome::success())
}

fn insert_close_paren(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    insert_close(ctx, r, count, '(', ')')
}

fn insert_close_bracket(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    insert_close(ctx, r, count, '[', ']')
}

fn insert_close_brace(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    insert_close(ctx, r, count, '{', '}')
}

/// Inserts `count` copies of `close`, then — if an unmatched `open` is
/// found behind the cursor — blinks the cursor there and back, per §4.7's
/// `blinkMatchingParenTimeout`.
fn insert_close(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32, open: char, close: char) -> Result<WidgetOutcome> {
    let text: String = std::iter::repeat(close).take(count.max(1) as usize).collect();
    ctx.state.buf.insert(&text, false);
    let closed_at = ctx.state.buf.cursor() - 1;

    if let Some(match_pos) = find_open(ctx.state.buf.as_slice(), closed_at, open, close) {
        ctx.state.buf.set_cursor(match_pos);
        ctx.redisplay.redraw(&*ctx.state)?;
        std::thread::sleep(ctx.config.blink_matching_paren_timeout());
        ctx.state.buf.set_cursor(closed_at + 1);
        ctx.redisplay.redraw(&*ctx.state)?;
    }
    Ok(WidgetOutcome::success())
}

fn find_open(chars: &[char], close_pos: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    for i in (0..close_pos).rev() {
        if chars[i] == close {
            depth += 1;
        } else if chars[i] == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

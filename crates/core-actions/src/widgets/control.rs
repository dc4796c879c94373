//! Control widgets (§4.7.1 "Control"): numeric arguments, undo/redo, and the
//! handful of widgets that affect loop bookkeeping rather than the buffer.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::{KeyEvent, KeyToken, NamedKey};
use core_input::BindingReader;
use core_state::ViMove;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("digit-argument", digit_argument);
    t.insert("do-lowercase-version", do_lowercase_version);
    t.insert("undo", undo);
    t.insert("redo", redo);
    t.insert("abort", abort);
    t.insert("clear-screen", clear_screen);
    t.insert("redisplay", redisplay);
    t.insert("exchange-point-and-mark", exchange_point_and_mark);
}

/// Accumulates `viRepeat` digit-by-digit (§4.6 step 3); `-` resets it rather
/// than negating, since the field is unsigned (see DESIGN.md).
fn digit_argument(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let Some(key) = ctx.last_keys.last() else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    if c == '-' {
        ctx.state.vi_repeat = 0;
        return Ok(WidgetOutcome::vi_arg_digit());
    }
    let Some(d) = c.to_digit(10) else {
        return Ok(WidgetOutcome::failure());
    };
    ctx.state.vi_repeat = ctx.state.vi_repeat.saturating_mul(10).saturating_add(d);
    Ok(WidgetOutcome::vi_arg_digit())
}

/// Bound to every uppercase letter in the emacs meta map: re-plays `Esc`
/// followed by the lowercased key so the next `read_binding` resolves the
/// lowercase meta binding instead, rather than needing direct access to the
/// widget table from inside a widget.
fn do_lowercase_version(ctx: &mut WidgetContext, r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let Some(key) = ctx.last_keys.last() else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    let lower = c.to_ascii_lowercase();
    if lower == c {
        return Ok(WidgetOutcome::failure());
    }
    r.push_back(KeyEvent::new(KeyToken::Char(lower), key.mods));
    r.push_back(KeyEvent::plain(KeyToken::Named(NamedKey::Esc)));
    Ok(WidgetOutcome::success())
}

fn undo(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let current = ctx.state.buf.copy();
    match ctx.state.undo.undo(&current) {
        Some(restored) => {
            ctx.state.buf.set_from(&restored);
            Ok(WidgetOutcome::undo_marker())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

fn redo(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let current = ctx.state.buf.copy();
    match ctx.state.undo.redo(&current) {
        Some(restored) => {
            ctx.state.buf.set_from(&restored);
            Ok(WidgetOutcome::undo_marker())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

/// Cancels any pending vi operator, numeric argument, or incremental search
/// and rings the bell — it never succeeds outright.
fn abort(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.state.vi_move = ViMove::Normal;
    ctx.state.search_term = None;
    *ctx.menu = None;
    Ok(WidgetOutcome::failure())
}

fn clear_screen(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.redisplay.clear()?;
    Ok(WidgetOutcome::success())
}

/// Forces a redraw without wiping the terminal first, unlike `clear-screen`.
fn redisplay(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.redisplay.redraw(&*ctx.state)?;
    Ok(WidgetOutcome::success())
}

fn exchange_point_and_mark(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let cursor = ctx.state.buf.cursor();
    let mark = ctx.state.mark.unwrap_or(cursor);
    ctx.state.mark = Some(cursor);
    ctx.state.buf.set_cursor(mark);
    Ok(WidgetOutcome::success())
}

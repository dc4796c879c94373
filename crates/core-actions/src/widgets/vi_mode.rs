//! Vi mode-switching and line-level widgets (§4.7.1 "Vi modes"): everything
//! bound directly in `vi-command`/`vi-insert` that isn't an operator, a char
//! search, or bracket matching.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::KeyToken;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("vi-insertion-mode", vi_insertion_mode);
    t.insert("vi-movement-mode", vi_movement_mode);
    t.insert("vi-append-mode", vi_append_mode);
    t.insert("vi-append-eol", vi_append_eol);
    t.insert("vi-insert-beg", vi_insert_beg);
    t.insert("vi-substitute-char", vi_substitute_char);
    t.insert("vi-substitute-line", vi_substitute_line);
    t.insert("vi-replace-char", vi_replace_char);
    t.insert("vi-put-after", vi_put_after);
    t.insert("vi-put-before", vi_put_before);
}

fn vi_insertion_mode(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

/// `Esc` in vi-insert mode: vi convention moves the cursor one column left
/// (clamped at 0) on the way back to command mode.
fn vi_movement_mode(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.state.buf.move_by(-1);
    ctx.state.keymap_name = "vi-command".to_string();
    Ok(WidgetOutcome::success())
}

fn vi_append_mode(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    ctx.state.buf.move_by(1);
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

fn vi_append_eol(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let end = line_end(ctx);
    ctx.state.buf.set_cursor(end);
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

fn vi_insert_beg(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let start = first_non_blank(ctx);
    ctx.state.buf.set_cursor(start);
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

/// `s`: deletes `count` characters forward and enters insert mode, the way
/// `cl` would — always succeeds, even on an empty buffer.
fn vi_substitute_char(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    ctx.state.buf.delete(count.max(1) as usize);
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

/// `S`: replaces the whole current line with an empty one and enters insert
/// mode, killing the old content the way `cc` would.
fn vi_substitute_line(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let start = line_start(ctx);
    let end = line_end(ctx);
    if end > start {
        let text = ctx.state.buf.substring(start, end);
        ctx.state.buf.set_cursor(end);
        ctx.state.buf.backspace(end - start);
        ctx.state.kill_ring.add(text);
    }
    ctx.state.buf.set_cursor(start);
    ctx.state.keymap_name = "vi-insert".to_string();
    Ok(WidgetOutcome::success())
}

/// `r`: reads one literal raw key and overwrites `count` characters at the
/// cursor with it, without leaving command mode.
fn vi_replace_char(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let n = count.max(1) as usize;
    if ctx.state.buf.cursor() + n > ctx.state.buf.len() {
        return Ok(WidgetOutcome::failure());
    }
    let Some(key) = r.read_raw_key()? else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    let replacement: String = std::iter::repeat(c).take(n).collect();
    ctx.state.buf.insert(&replacement, true);
    ctx.state.buf.move_by(-1);
    Ok(WidgetOutcome::success())
}

fn vi_put_after(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    put(ctx, count, true)
}

fn vi_put_before(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    put(ctx, count, false)
}

fn put(ctx: &mut WidgetContext, count: u32, after: bool) -> Result<WidgetOutcome> {
    let Some(text) = ctx.state.kill_ring.yank().map(str::to_string) else {
        return Ok(WidgetOutcome::failure());
    };
    if after && !ctx.state.buf.is_empty() {
        ctx.state.buf.move_by(1);
    }
    let repeated = text.repeat(count.max(1) as usize);
    ctx.state.buf.insert(&repeated, false);
    ctx.state.buf.move_by(-1);
    Ok(WidgetOutcome::success())
}

fn line_start(ctx: &WidgetContext) -> usize {
    ctx.state.buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(ctx: &WidgetContext) -> usize {
    let cursor = ctx.state.buf.cursor();
    ctx.state
        .buf
        .from_cursor()
        .find('\n')
        .map(|i| cursor + i)
        .unwrap_or(ctx.state.buf.len())
}

fn first_non_blank(ctx: &WidgetContext) -> usize {
    let start = line_start(ctx);
    let chars = ctx.state.buf.as_slice();
    let mut i = start;
    while i < chars.len() && chars[i] != '\n' && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

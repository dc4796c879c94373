//! Vi pending-operator widgets (§4.7.1 "Vi operators"): `d`/`c`/`y` set
//! `EditorState::vi_move` and read one more binding — the motion — to
//! determine the span they act on. A motion matching the operator itself
//! (`dd`/`cc`/`yy`) is the whole-line special case.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::KeyToken;
use core_input::{BindingReader, BindingReaderOptions, ReadBinding};
use core_state::ViMove;
use std::collections::HashMap;

use super::word;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("vi-delete-to", vi_delete_to);
    t.insert("vi-change-to", vi_change_to);
    t.insert("vi-yank-to", vi_yank_to);
    t.insert("vi-arg-digit", vi_arg_digit);
}

fn vi_delete_to(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    vi_operator(ctx, r, count, ViMove::DeleteTo)
}

fn vi_change_to(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    vi_operator(ctx, r, count, ViMove::ChangeTo)
}

fn vi_yank_to(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    vi_operator(ctx, r, count, ViMove::YankTo)
}

fn vi_operator(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32, op: ViMove) -> Result<WidgetOutcome> {
    ctx.state.vi_move = op;
    let start = ctx.state.buf.cursor();

    let Some(base) = ctx.keymaps.by_name("vi-command") else {
        ctx.state.vi_move = ViMove::Normal;
        return Ok(WidgetOutcome::failure());
    };

    let whole_line_name = match op {
        ViMove::DeleteTo => "vi-delete-to",
        ViMove::ChangeTo => "vi-change-to",
        ViMove::YankTo => "vi-yank-to",
        ViMove::Normal => unreachable!("vi_operator is only called with a pending-operator variant"),
    };

    let motion_name = match r.read_binding(base, None, &BindingReaderOptions::default())? {
        ReadBinding::Action(name, _) => name,
        _ => {
            ctx.state.vi_move = ViMove::Normal;
            return Ok(WidgetOutcome::failure());
        }
    };

    if motion_name == whole_line_name {
        return apply_whole_line(ctx, op, count);
    }

    match motion_target(ctx, &motion_name, count) {
        Some((end, inclusive)) => Ok(apply_operator(ctx, op, start, end, inclusive)),
        None => {
            ctx.state.vi_move = ViMove::Normal;
            Ok(WidgetOutcome::failure())
        }
    }
}

/// Resolves the small set of motions vi operators compose with to an
/// absolute end position, plus whether that end is inclusive of its
/// character (`$` is; the rest are exclusive spans).
fn motion_target(ctx: &WidgetContext, name: &str, count: u32) -> Option<(usize, bool)> {
    let buf = &ctx.state.buf;
    let n = count.max(1);
    match name {
        "backward-char" => {
            let mut pos = buf.cursor();
            for _ in 0..n {
                pos = pos.saturating_sub(1);
            }
            Some((pos, false))
        }
        "forward-char" => {
            let mut pos = buf.cursor();
            for _ in 0..n {
                pos = (pos + 1).min(buf.len());
            }
            Some((pos, false))
        }
        "forward-word" => {
            let mut pos = buf.cursor();
            for _ in 0..n {
                pos = word::forward_start(buf, pos);
            }
            Some((pos, false))
        }
        "backward-word" => {
            let mut pos = buf.cursor();
            for _ in 0..n {
                pos = word::backward(buf, pos);
            }
            Some((pos, false))
        }
        "end-of-line" => {
            let cursor = buf.cursor();
            let end = buf.from_cursor().find('\n').map(|i| cursor + i).unwrap_or(buf.len());
            Some((end, true))
        }
        "vi-first-print" => {
            let start = buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0);
            let chars = buf.as_slice();
            let mut i = start;
            while i < chars.len() && chars[i] != '\n' && chars[i].is_whitespace() {
                i += 1;
            }
            Some((i, false))
        }
        _ => None,
    }
}

fn apply_operator(ctx: &mut WidgetContext, op: ViMove, start: usize, mut end: usize, inclusive: bool) -> WidgetOutcome {
    if inclusive {
        end = (end + 1).min(ctx.state.buf.len());
    }
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    ctx.state.vi_move = ViMove::Normal;
    if from == to {
        return WidgetOutcome::failure();
    }
    let text = ctx.state.buf.substring(from, to);
    ctx.state.buf.set_cursor(from);
    match op {
        ViMove::YankTo => {
            ctx.state.kill_ring.add(text);
            WidgetOutcome::success()
        }
        ViMove::DeleteTo => {
            ctx.state.buf.delete(to - from);
            ctx.state.kill_ring.add(text);
            WidgetOutcome::success()
        }
        ViMove::ChangeTo => {
            ctx.state.buf.delete(to - from);
            ctx.state.kill_ring.add(text);
            ctx.state.keymap_name = "vi-insert".to_string();
            WidgetOutcome::success()
        }
        ViMove::Normal => unreachable!("apply_operator is only called with a pending-operator variant"),
    }
}

/// `dd`/`cc`/`yy`: act on `count` whole lines starting at the current line.
fn apply_whole_line(ctx: &mut WidgetContext, op: ViMove, count: u32) -> Result<WidgetOutcome> {
    let (start, end) = {
        let buf = &ctx.state.buf;
        let chars = buf.as_slice();
        let start = buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0);
        let mut end = start;
        for _ in 0..count.max(1) {
            while end < chars.len() && chars[end] != '\n' {
                end += 1;
            }
            if end < chars.len() {
                end += 1;
            }
        }
        (start, end.min(chars.len()))
    };
    Ok(apply_operator(ctx, op, start, end, false))
}

/// Vi's `0`/digit ambiguity: `0` with no count pending is beginning-of-line;
/// any other digit, or `0` after a digit already started a count, extends
/// `viRepeat`.
fn vi_arg_digit(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let Some(key) = ctx.last_keys.last() else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(c) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    if c == '0' && ctx.state.vi_repeat == 0 {
        let start = ctx.state.buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0);
        ctx.state.buf.set_cursor(start);
        return Ok(WidgetOutcome::success());
    }
    let Some(d) = c.to_digit(10) else {
        return Ok(WidgetOutcome::failure());
    };
    ctx.state.vi_repeat = ctx.state.vi_repeat.saturating_mul(10).saturating_add(d);
    Ok(WidgetOutcome::vi_arg_digit())
}

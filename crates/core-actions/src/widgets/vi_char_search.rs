//! Vi char-search widgets (§4.7.1 "Vi char search"): `f`/`F`/`t`/`T` all
//! dispatch through the single `vi-char-search` binding and read the target
//! character themselves; `;`/`,` repeat or reverse the last search.

use crate::{CharSearchKind, WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::KeyToken;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("vi-char-search", vi_char_search);
    t.insert("vi-repeat-char-search", vi_repeat_char_search);
    t.insert("vi-reverse-char-search", vi_reverse_char_search);
}

fn vi_char_search(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let Some(key) = ctx.last_keys.last() else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(trigger) = key.token else {
        return Ok(WidgetOutcome::failure());
    };
    let kind = match trigger {
        'f' => CharSearchKind::FindForward,
        'F' => CharSearchKind::FindBackward,
        't' => CharSearchKind::TillForward,
        'T' => CharSearchKind::TillBackward,
        _ => return Ok(WidgetOutcome::failure()),
    };
    let Some(target_key) = r.read_raw_key()? else {
        return Ok(WidgetOutcome::failure());
    };
    let KeyToken::Char(target) = target_key.token else {
        return Ok(WidgetOutcome::failure());
    };
    ctx.char_search.last = Some((target, kind));
    Ok(ok_if(apply_char_search(ctx, target, kind, count)))
}

fn vi_repeat_char_search(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let Some((target, kind)) = ctx.char_search.last else {
        return Ok(WidgetOutcome::failure());
    };
    Ok(ok_if(apply_char_search(ctx, target, kind, count)))
}

fn vi_reverse_char_search(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let Some((target, kind)) = ctx.char_search.last else {
        return Ok(WidgetOutcome::failure());
    };
    Ok(ok_if(apply_char_search(ctx, target, reverse(kind), count)))
}

fn reverse(kind: CharSearchKind) -> CharSearchKind {
    match kind {
        CharSearchKind::FindForward => CharSearchKind::FindBackward,
        CharSearchKind::FindBackward => CharSearchKind::FindForward,
        CharSearchKind::TillForward => CharSearchKind::TillBackward,
        CharSearchKind::TillBackward => CharSearchKind::TillForward,
    }
}

fn apply_char_search(ctx: &mut WidgetContext, target: char, kind: CharSearchKind, count: u32) -> bool {
    let cursor = ctx.state.buf.cursor();
    let n = count.max(1) as usize;
    let found = {
        let chars = ctx.state.buf.as_slice();
        match kind {
            CharSearchKind::FindForward | CharSearchKind::TillForward => {
                let mut hits = 0;
                let mut pos = None;
                for i in cursor + 1..chars.len() {
                    if chars[i] == target {
                        hits += 1;
                        if hits == n {
                            pos = Some(i);
                            break;
                        }
                    }
                }
                pos
            }
            CharSearchKind::FindBackward | CharSearchKind::TillBackward => {
                let mut hits = 0;
                let mut pos = None;
                for i in (0..cursor).rev() {
                    if chars[i] == target {
                        hits += 1;
                        if hits == n {
                            pos = Some(i);
                            break;
                        }
                    }
                }
                pos
            }
        }
    };
    let Some(mut target_pos) = found else {
        return false;
    };
    match kind {
        CharSearchKind::TillForward => target_pos = target_pos.saturating_sub(1),
        CharSearchKind::TillBackward => target_pos += 1,
        _ => {}
    }
    ctx.state.buf.set_cursor(target_pos);
    true
}

fn ok_if(b: bool) -> WidgetOutcome {
    if b {
        WidgetOutcome::success()
    } else {
        WidgetOutcome::failure()
    }
}

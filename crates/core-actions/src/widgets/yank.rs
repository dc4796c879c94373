//! Yank widgets (§4.7.1 "Yank"): insert and rotate through the kill ring.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("yank", yank);
    t.insert("yank-pop", yank_pop);
}

fn yank(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    match ctx.state.kill_ring.yank() {
        Some(text) => {
            let text = text.to_string();
            ctx.state.buf.insert(&text, false);
            Ok(WidgetOutcome::success())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

/// Must immediately follow a `yank`/`yank-pop`: removes the text that
/// rotation just inserted and replaces it with the next ring entry.
fn yank_pop(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let Some(previous) = ctx.state.kill_ring.current_entry() else {
        return Ok(WidgetOutcome::failure());
    };
    let previous_len = previous.chars().count();
    let Some(next) = ctx.state.kill_ring.yank_pop() else {
        return Ok(WidgetOutcome::failure());
    };
    let next = next.to_string();
    ctx.state.buf.backspace(previous_len);
    ctx.state.buf.insert(&next, false);
    Ok(WidgetOutcome::success())
}

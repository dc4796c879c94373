//! Incremental history search (§4.7.1 "Search"): reads raw keys one at a
//! time, re-searching on every keystroke and previewing the match in the
//! buffer, until a terminator key accepts or `C-g` aborts back to the
//! original line.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_events::{KeyModifiers, KeyToken, NamedKey};
use core_history::History;
use core_input::BindingReader;
use core_text::Buffer;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("history-incremental-search-backward", history_incremental_search_backward);
    t.insert("history-incremental-search-forward", history_incremental_search_forward);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

fn history_incremental_search_backward(ctx: &mut WidgetContext, r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    incremental_search(ctx, r, Direction::Backward)
}

fn history_incremental_search_forward(ctx: &mut WidgetContext, r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    incremental_search(ctx, r, Direction::Forward)
}

fn incremental_search(ctx: &mut WidgetContext, r: &mut BindingReader, dir: Direction) -> Result<WidgetOutcome> {
    let original = ctx.state.buf.copy();
    let original_index = ctx.history.index();
    let terminators = ctx.config.search_terminators().to_string();
    let mut term = ctx.state.search_term.clone().unwrap_or_default();

    loop {
        if !term.is_empty() {
            if let Some(found) = search_once(&mut *ctx.history, &term, dir) {
                ctx.state.buf = Buffer::from_str(&found);
                ctx.state.buf.set_cursor(0);
            }
        }

        let Some(key) = r.read_raw_key()? else {
            ctx.state.search_term = Some(term);
            return Ok(WidgetOutcome::success());
        };

        match key.token {
            KeyToken::Char(c) if key.mods.contains(KeyModifiers::CTRL) && c.eq_ignore_ascii_case(&'g') => {
                ctx.state.buf.set_from(&original);
                ctx.history.move_to(original_index);
                ctx.state.search_term = None;
                return Ok(WidgetOutcome::failure());
            }
            KeyToken::Char(c) if key.mods.contains(KeyModifiers::CTRL) && c.eq_ignore_ascii_case(&'r') => {
                step_history(&mut *ctx.history, dir);
            }
            KeyToken::Named(NamedKey::Backspace) => {
                term.pop();
            }
            KeyToken::Named(NamedKey::Enter) | KeyToken::Named(NamedKey::Esc) => {
                ctx.state.search_term = Some(term);
                return Ok(WidgetOutcome::success());
            }
            KeyToken::Char(c) if terminators.contains(c) => {
                r.push_back(key);
                ctx.state.search_term = Some(term);
                return Ok(WidgetOutcome::success());
            }
            KeyToken::Char(c) => {
                term.push(c);
            }
            _ => {}
        }
    }
}

/// Scans from the history cursor in `dir`, moving the cursor to and
/// returning the first entry containing `term`.
fn search_once(history: &mut dyn History, term: &str, dir: Direction) -> Option<String> {
    let len = history.len();
    let start = history.index();
    let range: Box<dyn Iterator<Item = usize>> = match dir {
        Direction::Backward => Box::new((0..start).rev()),
        Direction::Forward => Box::new(start + 1..len),
    };
    for i in range {
        if let Some(entry) = history.get(i) {
            if entry.contains(term) {
                history.move_to(i);
                return Some(entry.to_string());
            }
        }
    }
    None
}

fn step_history(history: &mut dyn History, dir: Direction) {
    match dir {
        Direction::Backward => {
            history.previous();
        }
        Direction::Forward => {
            history.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Harness;
    use core_events::KeyEvent;

    /// Queues `keys` onto `reader` so they're read back in the given order:
    /// `push_back` requeues ahead of pending input, so the queue is filled
    /// in reverse.
    fn queue_keys(reader: &mut BindingReader, keys: Vec<KeyEvent>) {
        for k in keys.into_iter().rev() {
            reader.push_back(k);
        }
    }

    fn plain_chars(s: &str) -> Vec<KeyEvent> {
        s.chars().map(|c| KeyEvent::plain(KeyToken::Char(c))).collect()
    }

    #[test]
    fn backward_search_finds_a_containing_entry() {
        let mut h = Harness::new("", 0);
        h.history.add("cargo build".to_string());
        h.history.add("cargo test".to_string());
        let (mut ctx, mut reader) = h.split();
        queue_keys(&mut reader, plain_chars("build\n"));
        let outcome = history_incremental_search_backward(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.to_string(), "cargo build");
    }

    #[test]
    fn abort_restores_the_original_line() {
        let mut h = Harness::new("unsaved edit", 0);
        h.history.add("cargo build".to_string());
        let (mut ctx, mut reader) = h.split();
        let mut keys = plain_chars("build");
        keys.push(KeyEvent::new(KeyToken::Char('g'), KeyModifiers::CTRL));
        queue_keys(&mut reader, keys);
        let outcome = history_incremental_search_backward(&mut ctx, &mut reader, 1).unwrap();
        assert!(!outcome.ok);
        assert_eq!(ctx.state.buf.to_string(), "unsaved edit");
    }
}

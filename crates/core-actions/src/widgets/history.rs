//! History navigation widgets (§4.7.1 "History"): step through entries and
//! replace the buffer with whatever the cursor lands on.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_history::History;
use core_input::BindingReader;
use core_text::Buffer;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("previous-history", previous_history);
    t.insert("next-history", next_history);
    t.insert("beginning-of-history", beginning_of_history);
    t.insert("end-of-history", end_of_history);
    t.insert("history-search-backward", history_search_backward);
    t.insert("history-search-forward", history_search_forward);
}

fn load_entry(ctx: &mut WidgetContext, entry: String) {
    ctx.state.buf = Buffer::from_str(&entry);
    ctx.state.buf.set_cursor(0);
}

fn previous_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    match ctx.history.previous() {
        Some(entry) => {
            let entry = entry.to_string();
            load_entry(ctx, entry);
            Ok(WidgetOutcome::success())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

/// Unlike `previous-history`, stepping off the end of recalled entries is
/// not a failure — it lands on a fresh, empty line, matching readline.
fn next_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    match ctx.history.next() {
        Some(entry) => {
            let entry = entry.to_string();
            load_entry(ctx, entry);
        }
        None => {
            ctx.state.buf = Buffer::new();
        }
    }
    Ok(WidgetOutcome::success())
}

fn beginning_of_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    if !ctx.history.move_to_first() {
        return Ok(WidgetOutcome::failure());
    }
    let entry = ctx.history.current().unwrap_or_default().to_string();
    load_entry(ctx, entry);
    Ok(WidgetOutcome::success())
}

fn end_of_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    if !ctx.history.move_to_last() {
        return Ok(WidgetOutcome::failure());
    }
    let entry = ctx.history.current().unwrap_or_default().to_string();
    load_entry(ctx, entry);
    Ok(WidgetOutcome::success())
}

/// The word up to the first whitespace (or the whole string, if none),
/// used as the match prefix by `history-search-backward/forward` and by
/// `up/down-line-or-history`'s single-line fallback (§4.7 "Motion").
pub(crate) fn first_word_of(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}

/// Scans from the history cursor towards `start`/`end` (per `backward`),
/// landing on and returning the first entry whose prefix matches `prefix`.
/// Leaves the history cursor unmoved on failure.
pub(crate) fn search_by_prefix(history: &mut dyn History, prefix: &str, backward: bool) -> Option<String> {
    if prefix.is_empty() {
        return None;
    }
    let len = history.len();
    let start = history.index();
    let range: Box<dyn Iterator<Item = usize>> = if backward {
        Box::new((0..start).rev())
    } else {
        Box::new(start + 1..len)
    };
    for i in range {
        if let Some(entry) = history.get(i) {
            if entry.starts_with(prefix) {
                history.move_to(i);
                return Some(entry.to_string());
            }
        }
    }
    None
}

fn history_search_backward(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let prefix = first_word_of(&ctx.state.buf.to_string()).to_string();
    match search_by_prefix(&mut *ctx.history, &prefix, true) {
        Some(entry) => {
            load_entry(ctx, entry);
            Ok(WidgetOutcome::success())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

fn history_search_forward(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let prefix = first_word_of(&ctx.state.buf.to_string()).to_string();
    match search_by_prefix(&mut *ctx.history, &prefix, false) {
        Some(entry) => {
            load_entry(ctx, entry);
            Ok(WidgetOutcome::success())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Harness;

    #[test]
    fn previous_history_recalls_the_most_recent_entry() {
        let mut h = Harness::new("", 0);
        h.history.add("first".to_string());
        h.history.add("second".to_string());
        let (mut ctx, mut reader) = h.split();
        previous_history(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "second");
    }

    #[test]
    fn next_history_past_the_end_yields_an_empty_line() {
        let mut h = Harness::new("", 0);
        h.history.add("only".to_string());
        {
            let (mut ctx, mut reader) = h.split();
            previous_history(&mut ctx, &mut reader, 1).unwrap();
        }
        let (mut ctx, mut reader) = h.split();
        next_history(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "");
    }

    #[test]
    fn previous_history_on_empty_history_fails() {
        let mut h = Harness::new("", 0);
        let (mut ctx, mut reader) = h.split();
        let outcome = previous_history(&mut ctx, &mut reader, 1).unwrap();
        assert!(!outcome.ok);
    }

    #[test]
    fn beginning_of_history_loads_the_oldest_entry() {
        let mut h = Harness::new("", 0);
        h.history.add("first".to_string());
        h.history.add("second".to_string());
        let (mut ctx, mut reader) = h.split();
        beginning_of_history(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "first");
    }

    #[test]
    fn history_search_backward_matches_on_first_word_prefix() {
        let mut h = Harness::new("git", 3);
        h.history.add("git status".to_string());
        h.history.add("make test".to_string());
        h.history.add("git log -1".to_string());
        let (mut ctx, mut reader) = h.split();
        let outcome = history_search_backward(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.to_string(), "git log -1");
    }

    #[test]
    fn history_search_backward_ignores_non_prefix_matches() {
        let mut h = Harness::new("status", 6);
        h.history.add("git status".to_string());
        let (mut ctx, mut reader) = h.split();
        let outcome = history_search_backward(&mut ctx, &mut reader, 1).unwrap();
        assert!(!outcome.ok);
    }

    #[test]
    fn history_search_forward_continues_from_the_current_cursor() {
        let mut h = Harness::new("git", 3);
        h.history.add("git status".to_string());
        h.history.add("git log -1".to_string());
        h.history.add("make test".to_string());
        {
            let (mut ctx, mut reader) = h.split();
            beginning_of_history(&mut ctx, &mut reader, 1).unwrap();
        }
        let (mut ctx, mut reader) = h.split();
        let outcome = history_search_forward(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.to_string(), "git log -1");
    }
}

//! Completion widgets (§4.8/§4.9): the matcher pipeline, the plain-list
//! display, and menu-complete's in-place candidate cycling.

use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_completion::{
    Candidate, CompletionEngine, CompletionOutcome, CompletionRequest, MenuState, ParseOutcome,
    ParsedLine, Parser, WhitespaceParser,
};
use core_input::BindingReader;
use core_text::Buffer;
use std::collections::HashMap;

/// `MenuState` needs a column count up front, and `show_candidates`/`Prefix`
/// listings wrap to *some* width. The real wrap width lives with the
/// terminal, several layers above this crate; widgets only need a
/// serviceable default until `core-model` threads the real one through.
const FALLBACK_TERMINAL_WIDTH: usize = 80;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("complete-word", complete_word);
    t.insert("possible-completions", possible_completions);
    t.insert("menu-complete-or-insert-tab", menu_complete_or_insert_tab);
    t.insert("menu-complete", menu_complete);
    t.insert("reverse-menu-complete", reverse_menu_complete);
    t.insert("menu-left", menu_left);
    t.insert("menu-right", menu_right);
    t.insert("menu-up", menu_up);
    t.insert("menu-down", menu_down);
}

/// Runs the full §4.8 pipeline (parse → `Completer` → `CompletionEngine`)
/// and applies whatever it decides. Shared with `widgets::delete`'s
/// `delete-char-or-list`, which falls into `possible-completions` when the
/// cursor sits at the end of the buffer.
pub(crate) fn run_completion(ctx: &mut WidgetContext, request: CompletionRequest) -> Result<WidgetOutcome> {
    let line = ctx.state.buf.to_string();
    let cursor = ctx.state.buf.cursor();
    let parsed = match WhitespaceParser.parse(&line, cursor) {
        ParseOutcome::Complete(p) => p,
        ParseOutcome::Incomplete(_) | ParseOutcome::Syntax => return Ok(WidgetOutcome::failure()),
    };
    let candidates = match ctx.completer.complete(&parsed) {
        Ok(c) => c,
        Err(_) => return Ok(WidgetOutcome::failure()),
    };
    let options = ctx.completion_options();
    let outcome = CompletionEngine::run(&parsed, &candidates, request, &options);
    apply_outcome(ctx, &parsed, outcome)
}

fn word_bounds(parsed: &ParsedLine) -> (usize, usize) {
    let start = parsed.cursor.saturating_sub(parsed.word_cursor);
    (start, start + parsed.word.chars().count())
}

fn replace_word(buf: &mut Buffer, start: usize, end: usize, replacement: &str, append_space: bool) {
    buf.set_cursor(end);
    buf.backspace(end - start);
    buf.insert(replacement, false);
    if append_space {
        buf.insert(" ", false);
    }
}

fn apply_outcome(ctx: &mut WidgetContext, parsed: &ParsedLine, outcome: CompletionOutcome) -> Result<WidgetOutcome> {
    match outcome {
        CompletionOutcome::NoCandidates | CompletionOutcome::NoChange => Ok(WidgetOutcome::failure()),
        CompletionOutcome::Single { value, append_space } => {
            let (start, end) = word_bounds(parsed);
            replace_word(&mut ctx.state.buf, start, end, &value, append_space);
            Ok(WidgetOutcome::success())
        }
        CompletionOutcome::Prefix { value, candidates } => {
            let (start, end) = word_bounds(parsed);
            replace_word(&mut ctx.state.buf, start, end, &value, false);
            if ctx.config.file.auto_list {
                ctx.redisplay.show_candidates(&candidates)?;
            }
            Ok(WidgetOutcome::success())
        }
        CompletionOutcome::List { candidates } => {
            ctx.redisplay.show_candidates(&candidates)?;
            Ok(WidgetOutcome::success())
        }
        CompletionOutcome::Menu { candidates } => {
            let columns = menu_columns(&candidates);
            let mut menu = MenuState::new(candidates, columns, ctx.config.file.list_rows_first);
            let value = menu.current().value.clone();
            let (start, end) = word_bounds(parsed);
            replace_word(&mut ctx.state.buf, start, end, &value, false);
            *ctx.menu = Some(menu);
            Ok(WidgetOutcome::success())
        }
    }
}

fn menu_columns(candidates: &[Candidate]) -> usize {
    let widest = candidates.iter().map(|c| c.display.chars().count()).max().unwrap_or(1);
    (FALLBACK_TERMINAL_WIDTH / (widest + 2)).max(1)
}

fn complete_word(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    run_completion(ctx, CompletionRequest::Complete)
}

fn possible_completions(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    run_completion(ctx, CompletionRequest::List)
}

/// Readline's classic Tab-in-vi-insert-mode widget: only enters menu-complete
/// when the cursor actually sits in or after a word, otherwise it's a plain
/// tab character.
fn menu_complete_or_insert_tab(ctx: &mut WidgetContext, r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    if ctx.menu.is_some() {
        return menu_complete(ctx, r, count);
    }
    let line = ctx.state.buf.to_string();
    let cursor = ctx.state.buf.cursor();
    let has_word = matches!(WhitespaceParser.parse(&line, cursor), ParseOutcome::Complete(p) if !p.word.is_empty());
    if !has_word {
        ctx.state.buf.insert("\t", false);
        return Ok(WidgetOutcome::success());
    }
    run_completion(ctx, CompletionRequest::Menu)
}

fn menu_step(ctx: &mut WidgetContext, advance: fn(&mut MenuState)) -> Result<WidgetOutcome> {
    let Some(menu) = ctx.menu.as_mut() else {
        return run_completion(ctx, CompletionRequest::Menu);
    };
    let prev_len = menu.current().value.chars().count();
    advance(menu);
    let value = menu.current().value.clone();
    ctx.state.buf.backspace(prev_len);
    ctx.state.buf.insert(&value, false);
    Ok(WidgetOutcome::success())
}

fn menu_complete(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::next)
}

fn reverse_menu_complete(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::previous)
}

fn menu_left(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::move_left)
}

fn menu_right(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::move_right)
}

fn menu_up(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::move_up)
}

fn menu_down(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    menu_step(ctx, MenuState::move_down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::Harness;
    use core_completion::{Completer, CompletionError};

    struct FixedCompleter(Vec<&'static str>);

    impl Completer for FixedCompleter {
        fn complete(&self, parsed: &ParsedLine) -> std::result::Result<Vec<Candidate>, CompletionError> {
            Ok(self
                .0
                .iter()
                .filter(|c| c.starts_with(&parsed.word))
                .map(|c| Candidate {
                    complete: true,
                    ..Candidate::new(*c)
                })
                .collect())
        }
    }

    #[test]
    fn complete_word_extends_unambiguous_prefix() {
        let mut h = Harness::new("ab", 2);
        h.completer = Box::new(FixedCompleter(vec!["abcdef", "abcxyz"]));
        let (mut ctx, mut reader) = h.split();
        let outcome = complete_word(&mut ctx, &mut reader, 1).unwrap();
        assert!(outcome.ok);
        assert_eq!(ctx.state.buf.to_string(), "abc");
    }

    #[test]
    fn complete_word_with_single_match_inserts_trailing_space() {
        let mut h = Harness::new("fo", 2);
        h.completer = Box::new(FixedCompleter(vec!["foo"]));
        let (mut ctx, mut reader) = h.split();
        complete_word(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.to_string(), "foo ");
    }

    #[test]
    fn menu_complete_cycles_candidates_in_place() {
        let mut h = Harness::new("f", 1);
        h.completer = Box::new(FixedCompleter(vec!["foo", "far"]));
        {
            let (mut ctx, mut reader) = h.split();
            menu_complete(&mut ctx, &mut reader, 1).unwrap();
        }
        let first = h.state.buf.to_string();
        {
            let (mut ctx, mut reader) = h.split();
            menu_complete(&mut ctx, &mut reader, 1).unwrap();
        }
        let second = h.state.buf.to_string();
        assert_ne!(first, second);
        assert!(h.menu.is_some());
    }
}

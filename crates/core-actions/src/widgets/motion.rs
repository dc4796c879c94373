//! Cursor motion widgets (§4.7.1 "Motion").

use super::word;
use crate::{WidgetContext, WidgetFn, WidgetOutcome};
use anyhow::Result;
use core_input::BindingReader;
use std::collections::HashMap;

pub fn register(t: &mut HashMap<&'static str, WidgetFn>) {
    t.insert("backward-char", backward_char);
    t.insert("forward-char", forward_char);
    t.insert("beginning-of-line", beginning_of_line);
    t.insert("end-of-line", end_of_line);
    t.insert("backward-word", backward_word);
    t.insert("forward-word", forward_word);
    t.insert("up-line-or-history", up_line_or_history);
    t.insert("down-line-or-history", down_line_or_history);
    t.insert("vi-first-print", vi_first_print);
}

fn backward_char(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let moved = ctx.state.buf.move_by(-(count as isize));
    Ok(ok_if(moved != 0 || count == 0))
}

fn forward_char(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let moved = ctx.state.buf.move_by(count as isize);
    Ok(ok_if(moved != 0 || count == 0))
}

fn beginning_of_line(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let buf = &mut ctx.state.buf;
    let start = buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0);
    buf.set_cursor(start);
    Ok(WidgetOutcome::success())
}

fn end_of_line(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let buf = &mut ctx.state.buf;
    let end = buf
        .from_cursor()
        .find('\n')
        .map(|i| buf.cursor() + i)
        .unwrap_or(buf.len());
    buf.set_cursor(end);
    Ok(WidgetOutcome::success())
}

fn backward_word(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let buf = &mut ctx.state.buf;
    let mut pos = buf.cursor();
    for _ in 0..count.max(1) {
        pos = word::backward(buf, pos);
    }
    let changed = buf.set_cursor(pos);
    Ok(ok_if(changed))
}

fn forward_word(ctx: &mut WidgetContext, _r: &mut BindingReader, count: u32) -> Result<WidgetOutcome> {
    let buf = &mut ctx.state.buf;
    let mut pos = buf.cursor();
    for _ in 0..count.max(1) {
        pos = word::forward(buf, pos);
    }
    let changed = buf.set_cursor(pos);
    Ok(ok_if(changed))
}

/// On a single-line buffer, falls through to a history search prefixed by
/// the buffer's first word rather than plain `previous-history` (§4.7
/// "Motion": "perform a history search prefixed by the first word of the
/// buffer").
fn up_line_or_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    if ctx.state.buf.up() {
        return Ok(WidgetOutcome::success());
    }
    let prefix = super::history::first_word_of(&ctx.state.buf.to_string()).to_string();
    match super::history::search_by_prefix(&mut *ctx.history, &prefix, true) {
        Some(entry) => {
            ctx.state.buf = core_text::Buffer::from_str(&entry);
            ctx.state.buf.set_cursor(0);
            Ok(WidgetOutcome::success())
        }
        None => Ok(WidgetOutcome::failure()),
    }
}

fn down_line_or_history(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    if ctx.state.buf.down() {
        return Ok(WidgetOutcome::success());
    }
    let prefix = super::history::first_word_of(&ctx.state.buf.to_string()).to_string();
    match super::history::search_by_prefix(&mut *ctx.history, &prefix, false) {
        Some(entry) => {
            ctx.state.buf = core_text::Buffer::from_str(&entry);
            ctx.state.buf.set_cursor(0);
            Ok(WidgetOutcome::success())
        }
        None => {
            // Past the last entry: restore the empty in-progress line.
            ctx.state.buf = core_text::Buffer::new();
            Ok(WidgetOutcome::success())
        }
    }
}

fn vi_first_print(ctx: &mut WidgetContext, _r: &mut BindingReader, _count: u32) -> Result<WidgetOutcome> {
    let buf = &mut ctx.state.buf;
    let start = buf.up_to_cursor().rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = buf.as_slice();
    let mut i = start;
    while i < line.len() && line[i] != '\n' && line[i].is_whitespace() {
        i += 1;
    }
    buf.set_cursor(i);
    Ok(WidgetOutcome::success())
}

fn ok_if(b: bool) -> WidgetOutcome {
    if b {
        WidgetOutcome::success()
    } else {
        WidgetOutcome::failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoopRedisplay, ViCharSearchState};
    use core_completion::NoopCompleter;
    use core_config::Config;
    use core_history::VecHistory;
    use core_keymap::default_keymaps::KeyMapSet;
    use core_state::EditorState;
    use core_terminal::{Capability, Console, ReadOutcome, TerminalCapabilities};
    use std::time::Duration;

    struct DeadConsole;
    impl Console for DeadConsole {
        fn size(&self) -> Result<(u16, u16)> {
            Ok((80, 24))
        }
        fn read(&mut self, _timeout: Option<Duration>) -> Result<ReadOutcome<core_events::InputEvent>> {
            Ok(ReadOutcome::Eof)
        }
        fn peek(&mut self, _timeout: Duration) -> Result<ReadOutcome<()>> {
            Ok(ReadOutcome::Eof)
        }
        fn write_str(&mut self, _s: &str) -> Result<()> {
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn puts(&mut self, _cap: Capability, _n: u16) -> Result<bool> {
            Ok(false)
        }
        fn capabilities(&self) -> &TerminalCapabilities {
            static CAPS: std::sync::OnceLock<TerminalCapabilities> = std::sync::OnceLock::new();
            CAPS.get_or_init(TerminalCapabilities::minimal)
        }
    }

    fn harness(
        line: &str,
        cursor: usize,
    ) -> (EditorState, VecHistory, NoopCompleter, Config, KeyMapSet, NoopRedisplay, ViCharSearchState, Option<core_completion::MenuState>, Vec<core_events::KeyEvent>) {
        let mut state = EditorState::new(String::new(), "emacs".to_string());
        state.buf = core_text::Buffer::from_str(line);
        state.buf.set_cursor(cursor);
        (
            state,
            VecHistory::new(),
            NoopCompleter,
            Config::default(),
            KeyMapSet::standard(),
            NoopRedisplay,
            ViCharSearchState::default(),
            None,
            Vec::new(),
        )
    }

    #[test]
    fn backward_word_skips_to_previous_word_start() {
        let (mut state, mut history, completer, config, keymaps, mut redisplay, mut cs, mut menu, keys) =
            harness("foo bar", 7);
        let mut console = DeadConsole;
        let mut reader = BindingReader::new(&mut console);
        let mut ctx = WidgetContext {
            state: &mut state,
            history: &mut history,
            completer: &completer,
            config: &config,
            keymaps: &keymaps,
            redisplay: &mut redisplay,
            char_search: &mut cs,
            menu: &mut menu,
            last_keys: &keys,
        };
        backward_word(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.cursor(), 4);
    }

    #[test]
    fn end_of_line_stops_before_embedded_newline() {
        let (mut state, mut history, completer, config, keymaps, mut redisplay, mut cs, mut menu, keys) =
            harness("abc\ndef", 1);
        let mut console = DeadConsole;
        let mut reader = BindingReader::new(&mut console);
        let mut ctx = WidgetContext {
            state: &mut state,
            history: &mut history,
            completer: &completer,
            config: &config,
            keymaps: &keymaps,
            redisplay: &mut redisplay,
            char_search: &mut cs,
            menu: &mut menu,
            last_keys: &keys,
        };
        end_of_line(&mut ctx, &mut reader, 1).unwrap();
        assert_eq!(ctx.state.buf.cursor(), 3);
    }
}

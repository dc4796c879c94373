//! `EditorCore` (§4.6): the top-level `readLine` loop wiring `BindingReader`,
//! the widget dispatch table, and the accept-line path together.
//!
//! `core-model` depends on `core-actions` but not the reverse, so the one
//! widget that needs collaborators `core-actions` doesn't have access to —
//! `accept-line`, which needs `Parser`/`EventExpander`/`History` — is
//! special-cased here via [`AcceptLineHandler`] instead of living in
//! `core_actions::build_table`'s dispatch table (see that crate's own doc
//! comment, and DESIGN.md).

pub use core_completion::{ParseOutcome, ParsedLine, Parser, WhitespaceParser};

use anyhow::Result;
use core_actions::{
    build_table, is_kill_widget, is_yank_widget, Redisplay, ViCharSearchState, WidgetContext,
    WidgetFn, WidgetOutcome,
};
use core_completion::{Completer, MenuState};
use core_config::{BellStyle, Config};
use core_events::{KeyEvent, KeyToken};
use core_history::{EventExpander, ExpansionError, History};
use core_input::{BindingReader, BindingReaderOptions, ReadBinding};
use core_keymap::default_keymaps::KeyMapSet;
use core_state::{EditorState, LoopState};
use core_terminal::Console;
use core_text::Buffer;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// How a `read_line` call ended (§4.6 step 3's `Done`/`Eof`/`Interrupt`
/// inspection, surfaced to the caller as a normal return rather than an
/// error — Eof and Interrupt are expected outcomes of a terminal session,
/// not failures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLineOutcome {
    /// The accepted line, after event expansion and any `postFn`.
    Line(String),
    /// Ctrl-D, or a closed input stream, with nothing pending.
    Eof,
    /// Ctrl-C; carries whatever had been typed so far.
    Interrupted(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcceptLineError {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
}

/// What `accept-line` did to `state` (§4.10, §9.1 `HISTORY_VERIFY`).
pub enum AcceptLineOutcome {
    /// `state.state` is now `Done`; `state.buf` holds the final line.
    Accepted,
    /// `HISTORY_VERIFY` is set and expansion changed the line: the buffer
    /// now holds the expanded text for the user to edit or re-confirm
    /// instead of being accepted outright.
    NeedsVerification,
}

/// Bridges `accept-line` to the `Parser`/`EventExpander`/`History`
/// collaborators (see the module doc comment for why this isn't a widget).
pub struct AcceptLineHandler;

impl AcceptLineHandler {
    pub fn handle(
        state: &mut EditorState,
        history: &mut dyn History,
        config: &Config,
    ) -> Result<AcceptLineOutcome, AcceptLineError> {
        let raw = state.buf.to_string();
        let expanded = if config.file.disable_event_expansion {
            raw.clone()
        } else {
            EventExpander::expand(&raw, history)?
        };

        if config.file.history_verify && expanded != raw {
            state.buf = Buffer::from_str(&expanded);
            state.buf.set_cursor(state.buf.len());
            return Ok(AcceptLineOutcome::NeedsVerification);
        }

        let mut line = expanded;
        if let Some(post) = state.post_fn.as_mut() {
            line = post(&line);
        }
        if !config.file.disable_history {
            history.add(line.clone());
        }
        state.buf = Buffer::from_str(&line);
        state.state = LoopState::Done;
        Ok(AcceptLineOutcome::Accepted)
    }
}

/// The top-level loop (§4.6): owns the static keymaps and widget table for
/// the process's lifetime; `read_line` drives one `readLine` invocation
/// start to finish.
pub struct EditorCore {
    config: Config,
    keymaps: KeyMapSet,
    table: HashMap<&'static str, WidgetFn>,
    binding_opts: BindingReaderOptions,
    initial_keymap: String,
}

impl EditorCore {
    pub fn new(config: Config) -> Self {
        let binding_opts = BindingReaderOptions {
            escape_timeout: config.escape_timeout(),
            ambiguous_binding: config.ambiguous_binding_timeout(),
        };
        Self {
            config,
            keymaps: KeyMapSet::standard(),
            table: build_table(),
            binding_opts,
            initial_keymap: "emacs".to_string(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymaps(&self) -> &KeyMapSet {
        &self.keymaps
    }

    /// Switches the keymap a fresh `read_line` call starts in (`"emacs"` or
    /// `"vi-insert"`) — the `EDITING_MODE` recognized option, §9.1.
    pub fn set_initial_keymap(&mut self, name: impl Into<String>) {
        self.initial_keymap = name.into();
    }

    /// Runs one `readLine` invocation to completion (§4.6 steps 1-4; raw
    /// mode entry/exit and signal delivery are the caller's `Console`'s
    /// job, not this loop's).
    pub fn read_line(
        &self,
        console: &mut dyn Console,
        history: &mut dyn History,
        completer: &dyn Completer,
        redisplay: &mut dyn Redisplay,
        prompt: impl Into<String>,
    ) -> Result<ReadLineOutcome> {
        let mut state = EditorState::new(prompt.into(), self.initial_keymap.clone());
        let mut char_search = ViCharSearchState::default();
        let mut menu: Option<MenuState> = None;
        let mut reader = BindingReader::new(console);

        redisplay.redraw(&state)?;

        loop {
            let base = self
                .keymaps
                .by_name(&state.keymap_name)
                .unwrap_or(&self.keymaps.emacs);
            let local = if menu.is_some() {
                self.keymaps.by_name("menu-select")
            } else {
                None
            };

            let resolved = reader.read_binding(base, local, &self.binding_opts)?;

            match resolved {
                ReadBinding::Interrupt => {
                    state.state = LoopState::Interrupt;
                }
                ReadBinding::WindowChanged { .. } => {
                    redisplay.redraw(&state)?;
                    continue;
                }
                ReadBinding::Eof => {
                    state.state = LoopState::Eof;
                }
                ReadBinding::Paste(text) => {
                    let before = state.buf.copy();
                    state.buf.insert(&text, false);
                    state.undo.push_if_changed(&before, &state.buf);
                    state.kill_ring.reset_last_kill();
                }
                ReadBinding::Unbound(keys) => {
                    if menu.is_some() {
                        commit_menu(&mut state, &mut menu, &mut reader, keys);
                        continue;
                    }
                    self.ring_bell(redisplay)?;
                }
                ReadBinding::Action(name, keys) => {
                    if menu.is_some() && !is_menu_widget(&name) {
                        commit_menu(&mut state, &mut menu, &mut reader, keys);
                        continue;
                    }

                    let before = state.buf.copy();
                    let outcome = if name == "accept-line" {
                        match AcceptLineHandler::handle(&mut state, history, &self.config) {
                            Ok(_) => WidgetOutcome::success(),
                            Err(err) => {
                                warn!(target: "model.accept_line", error = %err, "event expansion failed, clearing buffer");
                                state.buf = Buffer::new();
                                WidgetOutcome::failure()
                            }
                        }
                    } else {
                        dispatch_widget(
                            &self.table,
                            &name,
                            &mut state,
                            history,
                            completer,
                            &self.config,
                            &self.keymaps,
                            redisplay,
                            &mut char_search,
                            &mut menu,
                            &keys,
                            &mut reader,
                        )?
                    };

                    if !outcome.ok {
                        self.ring_bell(redisplay)?;
                    }
                    if !outcome.is_undo {
                        state.undo.push_if_changed(&before, &state.buf);
                    }
                    if !is_kill_widget(&name) {
                        state.kill_ring.reset_last_kill();
                    }
                    if !is_yank_widget(&name) {
                        state.kill_ring.reset_last_yank();
                    }
                    if !outcome.is_vi_arg_digit {
                        state.vi_repeat = 0;
                    }
                    if state.is_recording_macro() {
                        let text: String = keys.iter().filter_map(plain_char).collect();
                        state.note_macro_input(&text);
                    }
                }
            }

            match state.state {
                LoopState::Done => return Ok(ReadLineOutcome::Line(state.buf.to_string())),
                LoopState::Eof => return Ok(ReadLineOutcome::Eof),
                LoopState::Interrupt => {
                    return Ok(ReadLineOutcome::Interrupted(state.buf.to_string()));
                }
                LoopState::Normal => {}
            }

            redisplay.redraw(&state)?;
        }
    }

    /// `BELL_STYLE` (§9.1): `None` suppresses the bell entirely; the
    /// `Visible`/`Audible` split is the `Redisplay` implementation's call,
    /// since only it knows whether the terminal has a `flash` capability to
    /// fall back from.
    fn ring_bell(&self, redisplay: &mut dyn Redisplay) -> Result<()> {
        if self.config.bell_style == BellStyle::None {
            return Ok(());
        }
        redisplay.bell(self.config.bell_style)
    }
}

/// Resolves `name` against the widget table and applies it, building the
/// `WidgetContext` the same way every call site in `core-actions`'s own
/// tests does (`crate::test_util::Harness::split`).
#[allow(clippy::too_many_arguments)]
fn dispatch_widget(
    table: &HashMap<&'static str, WidgetFn>,
    name: &str,
    state: &mut EditorState,
    history: &mut dyn History,
    completer: &dyn Completer,
    config: &Config,
    keymaps: &KeyMapSet,
    redisplay: &mut dyn Redisplay,
    char_search: &mut ViCharSearchState,
    menu: &mut Option<MenuState>,
    last_keys: &[KeyEvent],
    reader: &mut BindingReader,
) -> Result<WidgetOutcome> {
    let Some(widget) = table.get(name) else {
        return Ok(WidgetOutcome::failure());
    };
    let mut ctx = WidgetContext {
        state,
        history,
        completer,
        config,
        keymaps,
        redisplay,
        char_search,
        menu,
        last_keys,
    };
    let count = ctx.state.effective_count();
    widget(&mut ctx, reader, count)
}

/// Bindings the `menu-select` local keymap resolves while a completion menu
/// is open (§4.9): everything else commits the menu instead of dispatching
/// normally.
fn is_menu_widget(name: &str) -> bool {
    matches!(
        name,
        "menu-complete"
            | "reverse-menu-complete"
            | "menu-left"
            | "menu-right"
            | "menu-up"
            | "menu-down"
            | "clear-screen"
            | "backward-delete-char"
    )
}

/// Commits the open menu (§4.9: "any other binding commits: inserts the
/// current candidate's value, appends a space iff complete and the next
/// char is not a space, pushes the binding back onto the input, and exits
/// menu mode"). The candidate's value is already in the buffer — every
/// menu step writes it as it goes — so committing only needs to decide the
/// trailing space and replay the key that ended the menu.
fn commit_menu(
    state: &mut EditorState,
    menu: &mut Option<MenuState>,
    reader: &mut BindingReader,
    keys: Vec<KeyEvent>,
) {
    if let Some(m) = menu.take() {
        if m.current().complete && state.buf.as_slice().last() != Some(&' ') {
            state.buf.insert(" ", false);
        }
    }
    for k in keys.into_iter().rev() {
        reader.push_back(k);
    }
}

/// The `Macro(String)` representation (§4.3) only replays literal
/// characters, so recording (§4.4 step 7) only captures plain `Char` keys;
/// named keys and modifier chords consumed while recording are dropped
/// rather than encoded, a limitation of the macro text format itself, not
/// of recording.
fn plain_char(k: &KeyEvent) -> Option<char> {
    match k.token {
        KeyToken::Char(c) if k.mods.is_empty() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_completion::NoopCompleter;
    use core_events::{InputEvent, KeyModifiers, NamedKey};
    use core_history::VecHistory;
    use core_terminal::{Capability, ReadOutcome, TerminalCapabilities};
    use std::collections::VecDeque as Deque;
    use std::time::Duration;

    struct ScriptedConsole {
        events: Deque<InputEvent>,
        caps: TerminalCapabilities,
    }

    impl ScriptedConsole {
        fn new(events: Vec<InputEvent>) -> Self {
            Self {
                events: events.into(),
                caps: TerminalCapabilities::minimal(),
            }
        }
    }

    impl Console for ScriptedConsole {
        fn size(&self) -> Result<(u16, u16)> {
            Ok((80, 24))
        }
        fn read(&mut self, _timeout: Option<Duration>) -> Result<ReadOutcome<InputEvent>> {
            match self.events.pop_front() {
                Some(ev) => Ok(ReadOutcome::Ready(ev)),
                None => Ok(ReadOutcome::Eof),
            }
        }
        fn peek(&mut self, _timeout: Duration) -> Result<ReadOutcome<()>> {
            Ok(ReadOutcome::Expired)
        }
        fn write_str(&mut self, _s: &str) -> Result<()> {
            Ok(())
        }
        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
        fn puts(&mut self, _capability: Capability, _n: u16) -> Result<bool> {
            Ok(false)
        }
        fn capabilities(&self) -> &TerminalCapabilities {
            &self.caps
        }
    }

    #[derive(Default)]
    struct RecordingRedisplay {
        bells: usize,
    }

    impl Redisplay for RecordingRedisplay {
        fn redraw(&mut self, _state: &EditorState) -> Result<()> {
            Ok(())
        }
        fn bell(&mut self, _style: BellStyle) -> Result<()> {
            self.bells += 1;
            Ok(())
        }
    }

    fn ch(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(KeyToken::Char(c)))
    }
    fn enter() -> InputEvent {
        InputEvent::Key(KeyEvent::plain(KeyToken::Named(NamedKey::Enter)))
    }

    #[test]
    fn typed_line_is_accepted_on_enter() {
        let core = EditorCore::new(Config::default());
        let mut console = ScriptedConsole::new(vec![ch('h'), ch('i'), enter()]);
        let mut history = VecHistory::new();
        let completer = NoopCompleter;
        let mut redisplay = RecordingRedisplay::default();

        let outcome = core
            .read_line(&mut console, &mut history, &completer, &mut redisplay, "> ")
            .unwrap();
        assert_eq!(outcome, ReadLineOutcome::Line("hi".to_string()));
        assert_eq!(history.current(), Some("hi"));
    }

    #[test]
    fn eof_on_an_empty_buffer_is_reported() {
        let core = EditorCore::new(Config::default());
        let mut console = ScriptedConsole::new(vec![]);
        let mut history = VecHistory::new();
        let completer = NoopCompleter;
        let mut redisplay = RecordingRedisplay::default();

        let outcome = core
            .read_line(&mut console, &mut history, &completer, &mut redisplay, "> ")
            .unwrap();
        assert_eq!(outcome, ReadLineOutcome::Eof);
    }

    #[test]
    fn unbound_key_rings_the_bell_and_keeps_going() {
        let core = EditorCore::new(Config::default());
        let weird = InputEvent::Key(KeyEvent::new(KeyToken::Char('q'), KeyModifiers::CTRL | KeyModifiers::ALT));
        let mut console = ScriptedConsole::new(vec![weird, ch('x'), enter()]);
        let mut history = VecHistory::new();
        let completer = NoopCompleter;
        let mut redisplay = RecordingRedisplay::default();

        let outcome = core
            .read_line(&mut console, &mut history, &completer, &mut redisplay, "> ")
            .unwrap();
        assert_eq!(outcome, ReadLineOutcome::Line("x".to_string()));
        assert_eq!(redisplay.bells, 1);
    }

    #[test]
    fn bang_bang_expands_against_history_before_accepting() {
        let core = EditorCore::new(Config::default());
        let keys: Vec<InputEvent> = "!!".chars().map(ch).chain(std::iter::once(enter())).collect();
        let mut console = ScriptedConsole::new(keys);
        let mut history = VecHistory::from_entries(vec!["echo one".to_string()]);
        let completer = NoopCompleter;
        let mut redisplay = RecordingRedisplay::default();

        let outcome = core
            .read_line(&mut console, &mut history, &completer, &mut redisplay, "> ")
            .unwrap();
        assert_eq!(outcome, ReadLineOutcome::Line("echo one".to_string()));
    }

    #[test]
    fn unknown_event_designator_clears_buffer_and_rings_bell_without_accepting() {
        let core = EditorCore::new(Config::default());
        let keys: Vec<InputEvent> = "!nope"
            .chars()
            .map(ch)
            .chain(std::iter::once(enter()))
            .chain("ok".chars().map(ch))
            .chain(std::iter::once(enter()))
            .collect();
        let mut console = ScriptedConsole::new(keys);
        let mut history = VecHistory::new();
        let completer = NoopCompleter;
        let mut redisplay = RecordingRedisplay::default();

        let outcome = core
            .read_line(&mut console, &mut history, &completer, &mut redisplay, "> ")
            .unwrap();
        assert_eq!(outcome, ReadLineOutcome::Line("ok".to_string()));
        assert!(redisplay.bells >= 1);
    }
}

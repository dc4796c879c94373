//! Shared widget-test scaffolding: an owned bundle of collaborators plus a
//! `DeadConsole` that reports EOF immediately, for widgets whose tests never
//! need to drive `BindingReader` against real input.

use crate::{NoopRedisplay, ViCharSearchState, WidgetContext};
use anyhow::Result;
use core_completion::{Completer, NoopCompleter};
use core_config::Config;
use core_events::{InputEvent, KeyEvent};
use core_history::VecHistory;
use core_input::BindingReader;
use core_keymap::default_keymaps::KeyMapSet;
use core_state::EditorState;
use core_terminal::{Capability, Console, ReadOutcome, TerminalCapabilities};
use std::time::Duration;

pub(crate) struct DeadConsole;

impl Console for DeadConsole {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((80, 24))
    }
    fn read(&mut self, _timeout: Option<Duration>) -> Result<ReadOutcome<InputEvent>> {
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

pub(crate) struct Harness {
    pub state: EditorState,
    pub history: VecHistory,
    pub completer: Box<dyn Completer>,
    pub config: Config,
    pub keymaps: KeyMapSet,
    pub redisplay: NoopRedisplay,
    pub char_search: ViCharSearchState,
    pub menu: Option<core_completion::MenuState>,
    pub last_keys: Vec<KeyEvent>,
    console: DeadConsole,
}

impl Harness {
    pub fn new(line: &str, cursor: usize) -> Self {
        let mut state = EditorState::new(String::new(), "emacs".to_string());
        state.buf = core_text::Buffer::from_str(line);
        state.buf.set_cursor(cursor);
        Self {
            state,
            history: VecHistory::new(),
            completer: Box::new(NoopCompleter),
            config: Config::default(),
            keymaps: KeyMapSet::standard(),
            redisplay: NoopRedisplay,
            char_search: ViCharSearchState::default(),
            menu: None,
            last_keys: Vec::new(),
            console: DeadConsole,
        }
    }

    /// Sets the key a widget under test reads back via `ctx.last_keys`
    /// (e.g. `self-insert`, `digit-argument`).
    pub fn with_last_key(mut self, ev: KeyEvent) -> Self {
        self.last_keys = vec![ev];
        self
    }

    pub fn ctx(&mut self) -> WidgetContext<'_> {
        WidgetContext {
            state: &mut self.state,
            history: &mut self.history,
            completer: self.completer.as_ref(),
            config: &self.config,
            keymaps: &self.keymaps,
            redisplay: &mut self.redisplay,
            char_search: &mut self.char_search,
            menu: &mut self.menu,
            last_keys: &self.last_keys,
        }
    }

    pub fn reader(&mut self) -> BindingReader<'_> {
        BindingReader::new(&mut self.console)
    }

    /// Borrows the context and reader halves disjointly so both can be
    /// passed to a widget in the same call without a double-`&mut self`
    /// borrow conflict.
    pub fn split(&mut self) -> (WidgetContext<'_>, BindingReader<'_>) {
        let ctx = WidgetContext {
            state: &mut self.state,
            history: &mut self.history,
            completer: self.completer.as_ref(),
            config: &self.config,
            keymaps: &self.keymaps,
            redisplay: &mut self.redisplay,
            char_search: &mut self.char_search,
            menu: &mut self.menu,
            last_keys: &self.last_keys,
        };
        let reader = BindingReader::new(&mut self.console);
        (ctx, reader)
    }
}

//! `BindingReader` (§4.4): turns a stream of raw key events from a
//! [`Console`] into resolved [`Binding`]s, one at a time, handling
//! multi-key prefix sequences, Escape disambiguation, and macro replay.
//!
//! The distilled spec describes this as reading from "a non-blocking
//! code-point reader"; here that reader is `core_terminal::Console`, and
//! "non-blocking" becomes "blocking with an optional timeout" since the
//! editor loop has nothing else to do while waiting for a key (§4.4
//! Concurrency: "single-threaded cooperative with the editor loop").

use anyhow::Result;
use core_events::{InputEvent, KeyEvent, KeyToken, NamedKey, Signal};
use core_keymap::{Binding, KeyMap, Lookup};
use core_terminal::{Console, ReadOutcome};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// Timeouts governing disambiguation (§6: `ESCAPE_TIMEOUT`, `AMBIGUOUS_BINDING`).
#[derive(Debug, Clone, Copy)]
pub struct BindingReaderOptions {
    /// `None` means wait indefinitely — the resolved semantics of
    /// `ESCAPE_TIMEOUT = 0` (see DESIGN.md).
    pub escape_timeout: Option<Duration>,
    pub ambiguous_binding: Duration,
}

impl Default for BindingReaderOptions {
    fn default() -> Self {
        Self {
            escape_timeout: None,
            ambiguous_binding: Duration::from_millis(1000),
        }
    }
}

/// What a single `read_binding` call can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadBinding {
    /// A resolved widget name, plus the raw keys consumed (fed to macro
    /// recording by the caller when `EditorState::macro_recording` is set).
    Action(String, Vec<KeyEvent>),
    /// No binding (direct or via `anotherKey` fallback) matched the consumed
    /// sequence.
    Unbound(Vec<KeyEvent>),
    /// Bracketed-paste content, inserted literally without consulting any
    /// keymap.
    Paste(String),
    Interrupt,
    WindowChanged { cols: u16, rows: u16 },
    Eof,
}

enum NextEvent {
    Key(KeyEvent),
    Signal(Signal),
    Paste(String),
    Eof,
}

/// Reads one binding at a time from a [`Console`], maintaining its own
/// push-back queue so macro replay and longest-match backoff can requeue
/// key events ahead of whatever the console produces next.
pub struct BindingReader<'c> {
    console: &'c mut dyn Console,
    pushback: VecDeque<KeyEvent>,
    paste_buf: Option<String>,
}

impl<'c> BindingReader<'c> {
    pub fn new(console: &'c mut dyn Console) -> Self {
        Self {
            console,
            pushback: VecDeque::new(),
            paste_buf: None,
        }
    }

    /// Requeue `ev` ahead of any pending input (longest-match backoff, or a
    /// menu-mode commit pushing the key that ended the menu back onto the
    /// stream).
    pub fn push_back(&mut self, ev: KeyEvent) {
        self.pushback.push_front(ev);
    }

    /// Enqueue macro text for replay as ordinary key presses (§4.4 step 4).
    fn push_macro(&mut self, text: &str) {
        for c in text.chars().rev() {
            self.pushback.push_front(KeyEvent::plain(KeyToken::Char(c)));
        }
    }

    fn next_event(&mut self, timeout: Option<Duration>) -> Result<Option<NextEvent>> {
        if let Some(ev) = self.pushback.pop_front() {
            return Ok(Some(NextEvent::Key(ev)));
        }
        if let Some(buf) = self.paste_buf.take() {
            return Ok(Some(NextEvent::Paste(buf)));
        }
        match self.console.read(timeout)? {
            ReadOutcome::Ready(InputEvent::Key(k)) => Ok(Some(NextEvent::Key(k))),
            ReadOutcome::Ready(InputEvent::Signal(s)) => Ok(Some(NextEvent::Signal(s))),
            ReadOutcome::Ready(InputEvent::PasteStart) => self.drain_paste(),
            ReadOutcome::Ready(InputEvent::PasteChunk(s)) => Ok(Some(NextEvent::Paste(s))),
            ReadOutcome::Ready(InputEvent::PasteEnd) => self.next_event(timeout),
            ReadOutcome::Expired => Ok(None),
            ReadOutcome::Eof => Ok(Some(NextEvent::Eof)),
        }
    }

    /// Accumulates chunks until `PasteEnd`, so the caller sees one `Paste`
    /// event for the whole burst rather than one per terminal write.
    fn drain_paste(&mut self) -> Result<Option<NextEvent>> {
        let mut acc = String::new();
        loop {
            match self.console.read(None)? {
                ReadOutcome::Ready(InputEvent::PasteChunk(s)) => {
                    trace!(target: "input.paste", chunk_len = s.len(), "chunk_flush");
                    acc.push_str(&s);
                }
                ReadOutcome::Ready(InputEvent::PasteEnd) => return Ok(Some(NextEvent::Paste(acc))),
                ReadOutcome::Eof => return Ok(Some(NextEvent::Eof)),
                _ => continue,
            }
        }
    }

    /// Reads and resolves one binding against `base`, consulting `local`
    /// first when set (search and menu modes, §4.4 step 6).
    pub fn read_binding(
        &mut self,
        base: &KeyMap,
        local: Option<&KeyMap>,
        opts: &BindingReaderOptions,
    ) -> Result<ReadBinding> {
        loop {
            let mut keys: Vec<KeyEvent> = Vec::new();
            let mut map_stack: Vec<&KeyMap> = Vec::new();
            let mut first = true;

            loop {
                let timeout = if keys.is_empty() {
                    None
                } else if is_escape_only(&keys) {
                    opts.escape_timeout
                } else {
                    Some(opts.ambiguous_binding)
                };

                let event = match self.next_event(timeout)? {
                    Some(ev) => ev,
                    None => {
                        // Disambiguation window expired with a pending prefix.
                        return Ok(self.fallback(&map_stack, keys));
                    }
                };

                let key = match event {
                    NextEvent::Key(k) => k,
                    NextEvent::Signal(Signal::Interrupt) => return Ok(ReadBinding::Interrupt),
                    NextEvent::Signal(Signal::WindowChanged { cols, rows }) => {
                        return Ok(ReadBinding::WindowChanged { cols, rows });
                    }
                    NextEvent::Paste(s) => return Ok(ReadBinding::Paste(s)),
                    NextEvent::Eof => return Ok(ReadBinding::Eof),
                };
                keys.push(key);

                let current = map_stack.last().copied().unwrap_or(base);
                let lookup = if first {
                    match local.map(|m| m.step(key)) {
                        Some(Lookup::Unbound) | None => current.step(key),
                        Some(other) => other,
                    }
                } else {
                    current.step(key)
                };
                first = false;

                match lookup {
                    Lookup::Bound(Binding::Macro(text)) => {
                        trace!(target: "input", len = text.len(), "macro replay");
                        self.push_macro(text);
                        keys.clear();
                        map_stack.clear();
                        first = true;
                        continue;
                    }
                    Lookup::Bound(Binding::Action(name)) => {
                        return Ok(ReadBinding::Action(name.clone(), keys));
                    }
                    Lookup::Bound(Binding::Prefix(_)) => unreachable!("step never returns a nested Prefix binding directly"),
                    Lookup::Prefix(next) => {
                        map_stack.push(next);
                        continue;
                    }
                    Lookup::Unbound => return Ok(self.fallback(&map_stack, keys)),
                }
            }
        }
    }

    /// Reads one raw key event, bypassing keymap resolution entirely —
    /// for widgets that want the literal next keystroke regardless of what
    /// it's bound to (`quoted-insert`, `vi-char-search`, `vi-replace-char`).
    /// Returns `None` on a signal, paste burst, or EOF.
    pub fn read_raw_key(&mut self) -> Result<Option<KeyEvent>> {
        match self.next_event(None)? {
            Some(NextEvent::Key(k)) => Ok(Some(k)),
            _ => Ok(None),
        }
    }

    /// On Unbound (direct or timed out), fall back to the deepest prefix
    /// map's `anotherKey`, per §4.3's promotion invariant; otherwise report
    /// the whole partial sequence as unbound.
    fn fallback(&mut self, map_stack: &[&KeyMap], keys: Vec<KeyEvent>) -> ReadBinding {
        if let Some(map) = map_stack.last() {
            if let Some(another) = map.another_key() {
                match another {
                    Binding::Action(name) => return ReadBinding::Action(name.clone(), keys),
                    Binding::Macro(text) => {
                        self.push_macro(text);
                        return ReadBinding::Unbound(keys);
                    }
                    Binding::Prefix(_) => {}
                }
            }
        }
        ReadBinding::Unbound(keys)
    }
}

fn is_escape_only(keys: &[KeyEvent]) -> bool {
    keys.len() == 1 && keys[0] == KeyEvent::plain(KeyToken::Named(NamedKey::Esc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_terminal::{Capability, TerminalCapabilities};

    struct FakeConsole {
        events: VecDeque<InputEvent>,
        caps: TerminalCapabilities,
    }

    impl FakeConsole {
        fn new(events: Vec<InputEvent>) -> Self {
            Self {
                events: events.into(),
                caps: TerminalCapabilities::minimal(),
            }
        }
    }

    impl Console for FakeConsole {
        fn size(&self) -> Result<(u16, u16)> {
            Ok((80, 24))
        }
        fn read(&mut self, _timeout: Option<Duration>) -> Result<ReadOutcome<InputEvent>> {
            match self.events.pop_front() {
                Some(ev) => Ok(ReadOutcome::Ready(ev)),
                None => Ok(ReadOutcome::Expired),
            }
        }
        fn peek(&mut self, _timeout: Duration) -> Result<ReadOutcome<()>> {
            Ok(if self.events.is_empty() {
                ReadOutcome::Expired
            } else {
                ReadOutcome::Ready(())
            })
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

    fn ch(c: char) -> KeyEvent {
        KeyEvent::plain(KeyToken::Char(c))
    }

    #[test]
    fn single_key_binding_resolves_immediately() {
        let mut km = KeyMap::new("test");
        km.bind(&[ch('a')], Binding::Action("self-insert".into()));
        let mut console = FakeConsole::new(vec![InputEvent::Key(ch('a'))]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Action("self-insert".into(), vec![ch('a')]));
    }

    #[test]
    fn multi_key_sequence_resolves_after_second_key() {
        use core_events::KeyModifiers;
        let mut km = KeyMap::new("test");
        let ctrl_x = KeyEvent::new(KeyToken::Char('x'), KeyModifiers::CTRL);
        let ctrl_s = KeyEvent::new(KeyToken::Char('s'), KeyModifiers::CTRL);
        km.bind(&[ctrl_x, ctrl_s], Binding::Action("save".into()));
        let mut console = FakeConsole::new(vec![InputEvent::Key(ctrl_x), InputEvent::Key(ctrl_s)]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(
            got,
            ReadBinding::Action("save".into(), vec![ctrl_x, ctrl_s])
        );
    }

    #[test]
    fn escape_alone_falls_back_to_another_key_on_timeout() {
        let mut km = KeyMap::new("test");
        let esc = KeyEvent::plain(KeyToken::Named(NamedKey::Esc));
        km.bind(&[esc], Binding::Action("esc-only".into()));
        km.bind(&[esc, ch('d')], Binding::Action("kill-word".into()));
        let mut console = FakeConsole::new(vec![InputEvent::Key(esc)]);
        let mut reader = BindingReader::new(&mut console);
        let opts = BindingReaderOptions {
            escape_timeout: Some(Duration::from_millis(0)),
            ambiguous_binding: Duration::from_millis(0),
        };
        let got = reader.read_binding(&km, None, &opts).unwrap();
        assert_eq!(got, ReadBinding::Action("esc-only".into(), vec![esc]));
    }

    #[test]
    fn macro_binding_replays_as_key_presses() {
        let mut km = KeyMap::new("test");
        km.bind(&[ch('m')], Binding::Macro("ab".into()));
        km.bind(&[ch('a')], Binding::Action("insert-a".into()));
        km.bind(&[ch('b')], Binding::Action("insert-b".into()));
        let mut console = FakeConsole::new(vec![InputEvent::Key(ch('m'))]);
        let mut reader = BindingReader::new(&mut console);
        let opts = BindingReaderOptions::default();
        let first = reader.read_binding(&km, None, &opts).unwrap();
        assert_eq!(first, ReadBinding::Action("insert-a".into(), vec![ch('a')]));
        let second = reader.read_binding(&km, None, &opts).unwrap();
        assert_eq!(second, ReadBinding::Action("insert-b".into(), vec![ch('b')]));
    }

    #[test]
    fn unbound_key_is_reported() {
        let km = KeyMap::new("test");
        let mut console = FakeConsole::new(vec![InputEvent::Key(ch('z'))]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Unbound(vec![ch('z')]));
    }

    #[test]
    fn local_map_takes_priority_over_base_map() {
        let mut base = KeyMap::new("base");
        base.bind(&[ch('a')], Binding::Action("base-action".into()));
        let mut local = KeyMap::new("local");
        local.bind(&[ch('a')], Binding::Action("local-action".into()));
        let mut console = FakeConsole::new(vec![InputEvent::Key(ch('a'))]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&base, Some(&local), &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Action("local-action".into(), vec![ch('a')]));
    }

    #[test]
    fn interrupt_signal_is_surfaced_directly() {
        let km = KeyMap::new("test");
        let mut console = FakeConsole::new(vec![InputEvent::Signal(Signal::Interrupt)]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Interrupt);
    }

    #[test]
    fn push_back_replays_key_on_next_read() {
        let mut km = KeyMap::new("test");
        km.bind(&[ch('a')], Binding::Action("insert-a".into()));
        let mut console = FakeConsole::new(vec![]);
        let mut reader = BindingReader::new(&mut console);
        reader.push_back(ch('a'));
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Action("insert-a".into(), vec![ch('a')]));
    }

    #[test]
    fn bracketed_paste_chunks_accumulate_into_one_binding() {
        let km = KeyMap::new("test");
        let mut console = FakeConsole::new(vec![
            InputEvent::PasteStart,
            InputEvent::PasteChunk("hello ".into()),
            InputEvent::PasteChunk("world".into()),
            InputEvent::PasteEnd,
        ]);
        let mut reader = BindingReader::new(&mut console);
        let got = reader
            .read_binding(&km, None, &BindingReaderOptions::default())
            .unwrap();
        assert_eq!(got, ReadBinding::Paste("hello world".into()));
    }
}

//! The terminal backend: raw-mode acquisition, the blocking code-point
//! reader/writer pair, and capability emission (§6 "Console collaborator").
//!
//! Everything in the distilled spec that would traditionally come from a
//! terminfo/ncurses binding is implemented directly against
//! `crossterm::event`/`crossterm::terminal`, which is the only terminal
//! dependency the teacher crate carries. `TerminalCapabilities` (see
//! [`capabilities`]) plays the terminfo-entry role; `puts` emits the ANSI
//! sequence for a capability instead of looking one up via `tigetstr`.
//!
//! Raw mode has no OS-level SIGINT/SIGWINCH delivery once `ISIG` is disabled:
//! Ctrl-C arrives as an ordinary key event (`0x03`) and a resize arrives as
//! `crossterm::event::Event::Resize`. [`Console::read`] folds both into
//! [`core_events::InputEvent::Signal`] so callers never touch OS signal
//! handlers directly (see DESIGN.md for the rationale).

pub mod capabilities;
pub use capabilities::TerminalCapabilities;

use anyhow::{Context, Result};
use core_events::{InputEvent, KeyEvent, KeyModifiers, KeyToken, NamedKey, Signal};
use crossterm::event::{
    self, Event as CEvent, KeyCode as CKeyCode, KeyEventKind as CKeyEventKind,
    KeyModifiers as CMods,
};
use crossterm::{cursor, execute, queue, terminal};
use std::io::{self, Write};
use std::time::Duration;

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

/// Raw-mode acquisition/restoration. Construction enters raw mode;
/// `Drop` restores it on every exit path (normal return, error unwind, panic).
pub struct CrosstermBackend {
    entered: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            terminal::enable_raw_mode().context("enable raw mode")?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            terminal::disable_raw_mode().context("disable raw mode")?;
            self.entered = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// The `-1`/`EXPIRED` sentinel from §6's `reader()` contract, made explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    Ready(T),
    Expired,
    Eof,
}

/// The Console collaborator: terminal size, a blocking/peekable input
/// stream, a buffered writer, and capability emission.
pub trait Console {
    fn size(&self) -> Result<(u16, u16)>;
    /// Block indefinitely (`timeout = None`) or up to `timeout` for the next
    /// input event.
    fn read(&mut self, timeout: Option<Duration>) -> Result<ReadOutcome<InputEvent>>;
    /// Non-consuming peek with the same timeout semantics as `read`, used by
    /// the Escape-ambiguity and paste-burst timers.
    fn peek(&mut self, timeout: Duration) -> Result<ReadOutcome<()>>;
    fn write_str(&mut self, s: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Emit a capability by name with the given cursor-relative argument
    /// (used for `parm_ich`/`parm_dch`/etc). Returns `false` if the terminal
    /// doesn't support the capability (caller falls back to overwrite).
    fn puts(&mut self, capability: Capability, n: u16) -> Result<bool>;
    fn capabilities(&self) -> &TerminalCapabilities;
}

/// Capability names consumed by `core-render`'s diffing algorithm (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    InsertCharacter,
    DeleteCharacter,
    InsertLine,
    DeleteLine,
    ClrEol,
    CarriageReturn,
    Bell,
    Flash,
}

pub struct CrosstermConsole {
    caps: TerminalCapabilities,
    out: io::Stdout,
    /// A single pushed-back key that `peek` observed but `read` hasn't
    /// consumed yet; mirrors the BindingReader's own push-back buffer one
    /// layer down so `peek` never drops an event.
    pending: Option<CEvent>,
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self {
            caps: TerminalCapabilities::detect(),
            out: io::stdout(),
            pending: None,
        }
    }

    fn next_raw(&mut self, timeout: Option<Duration>) -> Result<Option<CEvent>> {
        if let Some(ev) = self.pending.take() {
            return Ok(Some(ev));
        }
        match timeout {
            None => Ok(Some(event::read()?)),
            Some(d) => {
                if event::poll(d)? {
                    Ok(Some(event::read()?))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn translate(ev: CEvent) -> Option<InputEvent> {
        match ev {
            CEvent::Resize(cols, rows) => {
                Some(InputEvent::Signal(Signal::WindowChanged { cols, rows }))
            }
            CEvent::Key(k) if k.kind == CKeyEventKind::Release => None,
            CEvent::Key(k) => {
                if k.code == CKeyCode::Char('c') && k.modifiers.contains(CMods::CONTROL) {
                    return Some(InputEvent::Signal(Signal::Interrupt));
                }
                let token = match k.code {
                    CKeyCode::Char(c) => KeyToken::Char(c),
                    CKeyCode::Enter => KeyToken::Named(NamedKey::Enter),
                    CKeyCode::Esc => KeyToken::Named(NamedKey::Esc),
                    CKeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
                    CKeyCode::Tab => KeyToken::Named(NamedKey::Tab),
                    CKeyCode::BackTab => KeyToken::Named(NamedKey::BackTab),
                    CKeyCode::Up => KeyToken::Named(NamedKey::Up),
                    CKeyCode::Down => KeyToken::Named(NamedKey::Down),
                    CKeyCode::Left => KeyToken::Named(NamedKey::Left),
                    CKeyCode::Right => KeyToken::Named(NamedKey::Right),
                    CKeyCode::Home => KeyToken::Named(NamedKey::Home),
                    CKeyCode::End => KeyToken::Named(NamedKey::End),
                    CKeyCode::PageUp => KeyToken::Named(NamedKey::PageUp),
                    CKeyCode::PageDown => KeyToken::Named(NamedKey::PageDown),
                    CKeyCode::Insert => KeyToken::Named(NamedKey::Insert),
                    CKeyCode::Delete => KeyToken::Named(NamedKey::Delete),
                    CKeyCode::F(n) => KeyToken::Named(NamedKey::F(n)),
                    _ => return None,
                };
                let mut mods = KeyModifiers::empty();
                if k.modifiers.contains(CMods::CONTROL) {
                    mods |= KeyModifiers::CTRL;
                }
                if k.modifiers.contains(CMods::ALT) {
                    mods |= KeyModifiers::ALT;
                }
                if k.modifiers.contains(CMods::SHIFT) {
                    mods |= KeyModifiers::SHIFT;
                }
                Some(InputEvent::Key(KeyEvent::new(token, mods)))
            }
            _ => None,
        }
    }
}

impl Console for CrosstermConsole {
    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn read(&mut self, timeout: Option<Duration>) -> Result<ReadOutcome<InputEvent>> {
        loop {
            match self.next_raw(timeout)? {
                None => return Ok(ReadOutcome::Expired),
                Some(raw) => {
                    if let Some(ev) = Self::translate(raw) {
                        return Ok(ReadOutcome::Ready(ev));
                    }
                    // Unsupported event kind (mouse, focus, unmapped key): drop and keep waiting
                    // only if blocking; otherwise the caller's timeout has already been spent.
                    if timeout.is_some() {
                        return Ok(ReadOutcome::Expired);
                    }
                }
            }
        }
    }

    fn peek(&mut self, timeout: Duration) -> Result<ReadOutcome<()>> {
        if self.pending.is_some() {
            return Ok(ReadOutcome::Ready(()));
        }
        if event::poll(timeout)? {
            self.pending = Some(event::read()?);
            Ok(ReadOutcome::Ready(()))
        } else {
            Ok(ReadOutcome::Expired)
        }
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        queue!(self.out, crossterm::style::Print(s))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn puts(&mut self, capability: Capability, n: u16) -> Result<bool> {
        let supported = match capability {
            Capability::InsertCharacter => self.caps.insert_character,
            Capability::DeleteCharacter => self.caps.delete_character,
            Capability::InsertLine => self.caps.insert_line,
            Capability::DeleteLine => self.caps.delete_line,
            Capability::Flash => self.caps.flash,
            Capability::ClrEol | Capability::CarriageReturn | Capability::Bell => true,
        };
        if !supported {
            return Ok(false);
        }
        match capability {
            Capability::InsertCharacter => execute!(self.out, CapSeq(format!("\x1b[{n}@")))?,
            Capability::DeleteCharacter => execute!(self.out, CapSeq(format!("\x1b[{n}P")))?,
            Capability::InsertLine => execute!(self.out, CapSeq(format!("\x1b[{n}L")))?,
            Capability::DeleteLine => execute!(self.out, CapSeq(format!("\x1b[{n}M")))?,
            Capability::ClrEol => execute!(self.out, terminal::Clear(terminal::ClearType::UntilNewLine))?,
            Capability::CarriageReturn => execute!(self.out, cursor::MoveToColumn(0))?,
            Capability::Bell => execute!(self.out, CapSeq("\x07".to_string()))?,
            Capability::Flash => execute!(self.out, CapSeq("\x1b[?5h\x1b[?5l".to_string()))?,
        }
        Ok(true)
    }

    fn capabilities(&self) -> &TerminalCapabilities {
        &self.caps
    }
}

/// A raw escape sequence, queued verbatim (crossterm has no `InsertChars(n)`
/// command covering every terminal we target, so the handful of
/// parameterized capabilities are written directly).
struct CapSeq(String);

impl crossterm::Command for CapSeq {
    fn write_ansi(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_ctrl_c_is_interrupt_signal() {
        let ev = CEvent::Key(crossterm::event::KeyEvent::new(
            CKeyCode::Char('c'),
            CMods::CONTROL,
        ));
        assert_eq!(
            CrosstermConsole::translate(ev),
            Some(InputEvent::Signal(Signal::Interrupt))
        );
    }

    #[test]
    fn translate_resize_is_window_changed() {
        let ev = CEvent::Resize(80, 24);
        assert_eq!(
            CrosstermConsole::translate(ev),
            Some(InputEvent::Signal(Signal::WindowChanged { cols: 80, rows: 24 }))
        );
    }

    #[test]
    fn translate_plain_char_is_key() {
        let ev = CEvent::Key(crossterm::event::KeyEvent::new(
            CKeyCode::Char('a'),
            CMods::NONE,
        ));
        assert_eq!(
            CrosstermConsole::translate(ev),
            Some(InputEvent::Key(KeyEvent::plain(KeyToken::Char('a'))))
        );
    }

    #[test]
    fn translate_key_release_is_dropped() {
        let mut k = crossterm::event::KeyEvent::new(CKeyCode::Char('a'), CMods::NONE);
        k.kind = CKeyEventKind::Release;
        assert_eq!(CrosstermConsole::translate(CEvent::Key(k)), None);
    }
}

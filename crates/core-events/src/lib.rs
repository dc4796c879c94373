//! Wire types shared between the input reader and the dispatch loop.
//!
//! The editor is single-threaded and cooperatively scheduled (see the
//! concurrency notes on `core-model::EditorCore`): there is no async task
//! fan-in here, just the small vocabulary a blocking read can hand back.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modifier mask carried alongside a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0001;
        const ALT   = 0b0010;
        const SHIFT = 0b0100;
    }
}

/// Non-character keys the reader recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    F(u8),
}

/// A single logical key: either a Unicode scalar or a named key, the unit
/// `KeyMap` slots are indexed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Char(c) if (*c as u32) < 0x20 => write!(f, "^{}", (*c as u8 + 0x40) as char),
            KeyToken::Char(c) => write!(f, "{c}"),
            KeyToken::Named(n) => write!(f, "{n:?}"),
        }
    }
}

/// A key press as delivered by the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub token: KeyToken,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(token: KeyToken, mods: KeyModifiers) -> Self {
        Self { token, mods }
    }

    pub const fn plain(token: KeyToken) -> Self {
        Self::new(token, KeyModifiers::empty())
    }

    /// The raw code point this key contributes to a key-sequence index, or
    /// `None` for keys that only exist as modifier chords on a named key.
    pub fn sequence_byte(&self) -> Option<u8> {
        match self.token {
            KeyToken::Char(c) if self.mods.contains(KeyModifiers::CTRL) && c.is_ascii_alphabetic() => {
                Some((c.to_ascii_uppercase() as u8) & 0x1f)
            }
            KeyToken::Char(c) if (c as u32) < 128 => Some(c as u8),
            _ => None,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(KeyModifiers::CTRL) {
            write!(f, "C-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            write!(f, "M-")?;
        }
        write!(f, "{}", self.token)
    }
}

/// Process-level signals the editor reacts to (see the concurrency model).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    WindowChanged { cols: u16, rows: u16 },
}

/// Everything a single blocking read of the terminal can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Signal(Signal),
    PasteStart,
    PasteChunk(String),
    PasteEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_letter_maps_to_control_code() {
        let ev = KeyEvent::new(KeyToken::Char('w'), KeyModifiers::CTRL);
        assert_eq!(ev.sequence_byte(), Some(0x17));
    }

    #[test]
    fn plain_ascii_passes_through() {
        let ev = KeyEvent::plain(KeyToken::Char('a'));
        assert_eq!(ev.sequence_byte(), Some(b'a'));
    }

    #[test]
    fn display_shows_control_prefix() {
        let ev = KeyEvent::new(KeyToken::Char('x'), KeyModifiers::CTRL);
        assert_eq!(format!("{ev}"), "C-x");
    }

    #[test]
    fn control_char_token_displays_caret_notation() {
        assert_eq!(format!("{}", KeyToken::Char('\u{1}')), "^A");
    }
}

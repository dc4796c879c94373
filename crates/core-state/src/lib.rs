//! Per-`readLine`-call editor state (§3 `EditorState` row): the buffer,
//! kill ring, undo stack, and the scalar bookkeeping fields the top-level
//! loop (`core-model::EditorCore`) reads and mutates each iteration.

pub mod clipboard;
pub mod kill_ring;
pub mod undo;

pub use clipboard::{Clipboard, NoClipboard};
pub use kill_ring::{KillDirection, KillRing};
pub use undo::UndoEngine;

use core_text::Buffer;

/// Terminal states the loop checks after every widget dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Normal,
    Done,
    Eof,
    Interrupt,
}

/// Vi pending-operator state: set by `d`/`c`/`y` in vi-command mode, cleared
/// once the following motion completes the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViMove {
    Normal,
    YankTo,
    DeleteTo,
    ChangeTo,
}

/// All mutable state for one `readLine` invocation.
pub struct EditorState {
    pub buf: Buffer,
    /// Password-style masking character; `None` means echo normally.
    pub mask: Option<char>,
    pub prompt: String,
    pub right_prompt: String,
    /// Post-processing hook applied to the accepted line before it's
    /// returned (e.g. trimming trailing whitespace); `None` is the identity.
    pub post_fn: Option<Box<dyn FnMut(&str) -> String>>,
    pub keymap_name: String,
    pub state: LoopState,
    pub vi_repeat: u32,
    pub vi_move: ViMove,
    pub kill_ring: KillRing,
    pub undo: UndoEngine,
    pub search_term: Option<String>,
    pub search_index: usize,
    /// Accumulated text while a macro is being recorded; `None` when not
    /// recording.
    pub macro_recording: Option<String>,
    /// `exchange-point-and-mark`'s mark, set the first time it's used on a
    /// given buffer.
    pub mark: Option<usize>,
}

impl EditorState {
    pub fn new(prompt: impl Into<String>, keymap_name: impl Into<String>) -> Self {
        Self {
            buf: Buffer::new(),
            mask: None,
            prompt: prompt.into(),
            right_prompt: String::new(),
            post_fn: None,
            keymap_name: keymap_name.into(),
            state: LoopState::Normal,
            vi_repeat: 0,
            vi_move: ViMove::Normal,
            kill_ring: KillRing::default(),
            undo: UndoEngine::new(),
            search_term: None,
            search_index: 0,
            macro_recording: None,
            mark: None,
        }
    }

    /// `count = viRepeat ? viRepeat : 1`, per §4.6 step 3.
    pub fn effective_count(&self) -> u32 {
        if self.vi_repeat == 0 { 1 } else { self.vi_repeat }
    }

    pub fn is_recording_macro(&self) -> bool {
        self.macro_recording.is_some()
    }

    pub fn begin_macro_recording(&mut self) {
        self.macro_recording = Some(String::new());
    }

    pub fn end_macro_recording(&mut self) -> Option<String> {
        self.macro_recording.take()
    }

    pub fn note_macro_input(&mut self, text: &str) {
        if let Some(acc) = &mut self.macro_recording {
            acc.push_str(text);
        }
    }
}

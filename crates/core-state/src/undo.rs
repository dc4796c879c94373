//! Undo/redo stack of buffer snapshots (§4.6).
//!
//! The top-level loop snapshots the buffer before dispatching each widget
//! and pushes the snapshot only if the widget didn't set `isUndo` and the
//! buffer text actually changed — simpler than tracking a content hash
//! since `core_text::Buffer` is cheaply comparable and cloneable.

use core_text::Buffer;
use tracing::trace;

pub const UNDO_HISTORY_MAX: usize = 200;

#[derive(Default)]
pub struct UndoEngine {
    undo_stack: Vec<Buffer>,
    redo_stack: Vec<Buffer>,
}

impl UndoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Push `before` onto the undo stack unless it is identical to the
    /// current top (no-op widget) and clear the redo stack, since any new
    /// edit invalidates previously undone states.
    pub fn push_if_changed(&mut self, before: &Buffer, after: &Buffer) {
        if before == after {
            return;
        }
        self.undo_stack.push(before.clone());
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "push_snapshot");
        if self.undo_stack.len() > UNDO_HISTORY_MAX {
            self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
    }

    /// Pop the most recent undo snapshot, pushing `current` onto the redo
    /// stack, and return the restored buffer.
    pub fn undo(&mut self, current: &Buffer) -> Option<Buffer> {
        let restored = self.undo_stack.pop()?;
        self.redo_stack.push(current.clone());
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Some(restored)
    }

    /// Pop the most recent redo snapshot, pushing `current` onto the undo
    /// stack, and return the restored buffer.
    pub fn redo(&mut self, current: &Buffer) -> Option<Buffer> {
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push(current.clone());
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Some(restored)
    }
}

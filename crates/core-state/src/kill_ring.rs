//! Bounded ring of killed text (§4.2).

use std::collections::VecDeque;

/// Direction of the most recent kill, used to decide whether the next kill
/// concatenates onto it or starts a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillDirection {
    Forward,
    Backward,
}

pub const DEFAULT_CAPACITY: usize = 60;

pub struct KillRing {
    ring: VecDeque<String>,
    capacity: usize,
    last_kill: Option<KillDirection>,
    /// Index into `ring` the last `yank`/`yank_pop` returned, counting back
    /// from the most recent entry. `None` means no yank is in progress.
    yank_cursor: Option<usize>,
}

impl Default for KillRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl KillRing {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: VecDeque::new(),
            capacity: capacity.max(1),
            last_kill: None,
            yank_cursor: None,
        }
    }

    /// Push a forward kill (e.g. `kill-line`, `kill-word`). Concatenates
    /// onto the most recent entry if the previous action was also a
    /// forward kill.
    pub fn add(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.last_kill == Some(KillDirection::Forward) {
            if let Some(front) = self.ring.front_mut() {
                front.push_str(s);
                self.last_kill = Some(KillDirection::Forward);
                return;
            }
        }
        self.push_new(s.to_string());
        self.last_kill = Some(KillDirection::Forward);
    }

    /// Push a backward kill (e.g. `backward-kill-word`,
    /// `unix-line-discard`). Prepends onto the most recent entry if the
    /// previous action was also a backward kill.
    pub fn add_backwards(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.last_kill == Some(KillDirection::Backward) {
            if let Some(front) = self.ring.front_mut() {
                front.insert_str(0, s);
                self.last_kill = Some(KillDirection::Backward);
                return;
            }
        }
        self.push_new(s.to_string());
        self.last_kill = Some(KillDirection::Backward);
    }

    fn push_new(&mut self, s: String) {
        self.ring.push_front(s);
        while self.ring.len() > self.capacity {
            self.ring.pop_back();
        }
    }

    /// Returns the most recent entry without popping it, and marks a yank
    /// as in progress so `yank_pop` can rotate.
    pub fn yank(&mut self) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }
        self.yank_cursor = Some(0);
        self.ring.front().map(String::as_str)
    }

    /// After a `yank`, rotates to the previous entry and returns it.
    /// Returns `None` if no yank is currently active.
    pub fn yank_pop(&mut self) -> Option<&str> {
        let cursor = self.yank_cursor?;
        if self.ring.is_empty() {
            return None;
        }
        let next = (cursor + 1) % self.ring.len();
        self.yank_cursor = Some(next);
        self.ring.get(next).map(String::as_str)
    }

    /// The entry the most recent `yank`/`yank_pop` returned, without
    /// advancing the rotation — lets a caller know how much text to remove
    /// before inserting the next rotation's entry.
    pub fn current_entry(&self) -> Option<&str> {
        let cursor = self.yank_cursor?;
        self.ring.get(cursor).map(String::as_str)
    }

    pub fn reset_last_kill(&mut self) {
        self.last_kill = None;
    }

    pub fn reset_last_yank(&mut self) {
        self.yank_cursor = None;
    }

    pub fn is_yank_active(&self) -> bool {
        self.yank_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

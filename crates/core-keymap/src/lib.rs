//! `KeyMap`: the 2048-slot prefix-keyed dispatch table (§4.3) plus the static
//! construction of the default keymaps (§4.9 "DefaultKeymaps", added as its
//! own module [`default_keymaps`]).
//!
//! A keymap slot is addressed by folding a [`KeyEvent`] down to a single
//! index: 256 "rows", one per [`KeyModifiers`] bitmask (3 bits -> 8 values),
//! times 256 "columns" covering the ASCII byte range plus a block of named
//! keys — `8 * 256 == 2048`, matching the slot count the spec calls for.
//! Binding a sequence longer than one key recurses into a nested `Prefix`
//! keymap, mirroring "sequences longer than one byte are stored as nested
//! prefix maps".

pub mod default_keymaps;

use core_events::{KeyEvent, KeyModifiers, KeyToken, NamedKey};
use tracing::trace;

/// Total slots per keymap level: 8 modifier buckets * 256 base codes.
pub const SLOT_COUNT: usize = 2048;
const BASE_RANGE: usize = 256;

/// What a bound key sequence resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A named widget (e.g. `"backward-char"`). Collapses the distilled
    /// spec's `Action`/`WidgetRef` kinds into one, since this crate has no
    /// use for distinguishing them (both are just a name looked up in
    /// `core-actions`'s widget table) — see DESIGN.md.
    Action(String),
    /// Raw input text replayed through the `BindingReader`'s push-back queue.
    Macro(String),
    /// A nested keymap awaiting the next key of a multi-key sequence.
    Prefix(Box<KeyMap>),
}

/// Slot index derived from a key event: `mods_bucket * 256 + base_code`.
fn slot_index(ev: KeyEvent) -> usize {
    let base = match ev.token {
        KeyToken::Char(c) if (c as u32) < 128 => c as usize,
        KeyToken::Char(_) => 127,
        KeyToken::Named(n) => 128 + named_ordinal(n),
    };
    let bucket = ev.mods.bits() as usize;
    bucket * BASE_RANGE + base
}

fn named_ordinal(n: NamedKey) -> usize {
    match n {
        NamedKey::Enter => 0,
        NamedKey::Esc => 1,
        NamedKey::Backspace => 2,
        NamedKey::Tab => 3,
        NamedKey::BackTab => 4,
        NamedKey::Up => 5,
        NamedKey::Down => 6,
        NamedKey::Left => 7,
        NamedKey::Right => 8,
        NamedKey::Home => 9,
        NamedKey::End => 10,
        NamedKey::PageUp => 11,
        NamedKey::PageDown => 12,
        NamedKey::Insert => 13,
        NamedKey::Delete => 14,
        // F1..F24 land at 15..39, leaving headroom to 127 before the bucket wraps.
        NamedKey::F(n) => 15 + n.min(88) as usize,
    }
}

/// Result of a single-step lookup against one keymap level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Unbound,
    Bound(&'a Binding),
    /// A prefix was matched; recurse into the nested keymap for the next key.
    Prefix(&'a KeyMap),
}

/// A single keymap level: 2048 direct slots plus the `anotherKey` fallback
/// used when an ambiguous `Prefix` promotion needs to remember the binding
/// it displaced (see `bind`'s invariant).
#[derive(Clone)]
pub struct KeyMap {
    name: String,
    slots: Box<[Option<Binding>]>,
    another_key: Option<Box<Binding>>,
}

impl std::fmt::Debug for KeyMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMap")
            .field("name", &self.name)
            .field("bound_slots", &self.slots.iter().filter(|s| s.is_some()).count())
            .finish()
    }
}

impl KeyMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: (0..SLOT_COUNT).map(|_| None).collect(),
            another_key: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn another_key(&self) -> Option<&Binding> {
        self.another_key.as_deref()
    }

    pub fn set_another_key(&mut self, binding: Binding) {
        self.another_key = Some(Box::new(binding));
    }

    /// Bind `sequence` (one or more key events) to `binding`. Binding a
    /// sequence whose proper prefix already holds a terminal `Action`/`Macro`
    /// promotes that leaf into a `Prefix` map, preserving the displaced
    /// binding as the new map's `anotherKey` (§4.3 invariant).
    pub fn bind(&mut self, sequence: &[KeyEvent], binding: Binding) {
        assert!(!sequence.is_empty(), "cannot bind an empty sequence");
        let idx = slot_index(sequence[0]);
        if sequence.len() == 1 {
            trace!(target: "keymap", map = %self.name, idx, "bind");
            self.slots[idx] = Some(binding);
            return;
        }
        let rest = &sequence[1..];
        let existing = self.slots[idx].take();
        let mut next = match existing {
            Some(Binding::Prefix(map)) => map,
            Some(displaced) => {
                let mut map = Box::new(KeyMap::new(format!("{}:{idx}", self.name)));
                map.set_another_key(displaced);
                map
            }
            None => Box::new(KeyMap::new(format!("{}:{idx}", self.name))),
        };
        next.bind(rest, binding);
        self.slots[idx] = Some(Binding::Prefix(next));
    }

    /// Bind only if the slot (or the head of a longer sequence) is currently
    /// unbound; never overwrites.
    pub fn bind_if_not_bound(&mut self, sequence: &[KeyEvent], binding: Binding) {
        if matches!(self.lookup_one(sequence[0]), Lookup::Unbound) {
            self.bind(sequence, binding);
        }
    }

    pub fn unbind(&mut self, sequence: &[KeyEvent]) {
        if sequence.is_empty() {
            return;
        }
        let idx = slot_index(sequence[0]);
        if sequence.len() == 1 {
            self.slots[idx] = None;
            return;
        }
        if let Some(Binding::Prefix(map)) = &mut self.slots[idx] {
            map.unbind(&sequence[1..]);
        }
    }

    fn lookup_one(&self, ev: KeyEvent) -> Lookup<'_> {
        match &self.slots[slot_index(ev)] {
            None => Lookup::Unbound,
            Some(Binding::Prefix(map)) => Lookup::Prefix(map),
            Some(b) => Lookup::Bound(b),
        }
    }

    /// Single-step lookup used by the `BindingReader`: given one key event,
    /// returns what this level resolves it to.
    pub fn step(&self, ev: KeyEvent) -> Lookup<'_> {
        self.lookup_one(ev)
    }

    /// Full-sequence convenience lookup, mainly for tests: walks every key in
    /// `sequence` through nested prefix maps.
    pub fn lookup(&self, sequence: &[KeyEvent]) -> Lookup<'_> {
        let mut map = self;
        for (i, &ev) in sequence.iter().enumerate() {
            match map.step(ev) {
                Lookup::Unbound => return Lookup::Unbound,
                Lookup::Bound(b) => {
                    return if i + 1 == sequence.len() {
                        Lookup::Bound(b)
                    } else {
                        Lookup::Unbound
                    };
                }
                Lookup::Prefix(next) => map = next,
            }
        }
        Lookup::Prefix(map)
    }
}

//! Built-in widgets (§4.7) and the name→function dispatch table the
//! top-level loop (`core-model::EditorCore`) resolves each binding against.
//!
//! `accept-line` is conspicuously absent from [`build_table`]: it needs the
//! external `Parser`, `EventExpander`, and `History` collaborators that live
//! above this crate's layer (`core-model` depends on `core-actions`, not the
//! reverse), so `EditorCore` special-cases that one widget name via
//! [`AcceptLineHandler`] instead of looking it up here. See DESIGN.md.

pub mod widgets;

#[cfg(test)]
mod test_util;

use anyhow::Result;
use core_completion::{Candidate, Completer, CompletionOptions};
use core_config::{BellStyle, Config};
use core_events::KeyEvent;
use core_history::History;
use core_input::BindingReader;
use core_keymap::default_keymaps::KeyMapSet;
use core_state::EditorState;
use std::collections::HashMap;

/// A collaborator the loop redraws through after every widget dispatch —
/// mirrors `core_state::Clipboard`/`core_completion::Completer`: a trait at
/// the seam so this crate never depends on `core-render` directly.
pub trait Redisplay {
    fn redraw(&mut self, state: &EditorState) -> Result<()>;

    /// Show a completion candidate listing (`possible-completions`, or an
    /// `AUTO_LIST`-triggered prefix extension). Default does nothing, so a
    /// `Redisplay` that only ever draws the edited line is still a valid
    /// collaborator.
    fn show_candidates(&mut self, _candidates: &[Candidate]) -> Result<()> {
        Ok(())
    }

    /// `clear-screen`: wipe the terminal before the next `redraw`.
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    /// Rings the bell per `BELL_STYLE` (§9.1). Default does nothing — a
    /// `Redisplay` with no terminal to flash or beep is still valid.
    fn bell(&mut self, _style: BellStyle) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRedisplay;

impl Redisplay for NoopRedisplay {
    fn redraw(&mut self, _state: &EditorState) -> Result<()> {
        Ok(())
    }
}

/// Direction/kind of the last `vi-char-search`, remembered across widget
/// dispatches so `;`/`,` can repeat or reverse it. Lives outside
/// `core_state::EditorState` — `core-model` owns one instance per
/// `readLine` call and threads it through `WidgetContext`, the same
/// externalized-collaborator-state pattern as menu and incremental search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSearchKind {
    FindForward,
    FindBackward,
    TillForward,
    TillBackward,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ViCharSearchState {
    pub last: Option<(char, CharSearchKind)>,
}

/// Everything a widget needs besides the raw key count: the mutable editor
/// state, read-only collaborators, and the keymaps it may need to read
/// further bindings against (vi operators, char-search, incremental search,
/// menu mode all read ahead of the main loop).
pub struct WidgetContext<'a> {
    pub state: &'a mut EditorState,
    pub history: &'a mut dyn History,
    pub completer: &'a dyn Completer,
    pub config: &'a Config,
    pub keymaps: &'a KeyMapSet,
    pub redisplay: &'a mut dyn Redisplay,
    pub char_search: &'a mut ViCharSearchState,
    /// Menu-mode selection, externalized from `EditorState` the same way
    /// `char_search` is: it's scoped to one completion pass, not the whole
    /// `readLine` call (§4.9).
    pub menu: &'a mut Option<core_completion::MenuState>,
    /// The raw key sequence `BindingReader::read_binding` consumed to
    /// resolve the widget being dispatched. Most widgets ignore this (their
    /// behavior depends only on `count`), but a few — `self-insert`,
    /// `digit-argument`, `vi-arg-digit`, `do-lowercase-version` — need the
    /// literal key that triggered them, mirroring GNU readline's
    /// `rl_executing_key`.
    pub last_keys: &'a [KeyEvent],
}

impl WidgetContext<'_> {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            case_insensitive: self.config.file.case_insensitive,
            errors: self.config.errors() as usize,
            list_max: self.config.file.list_max,
            auto_list: self.config.file.auto_list,
            auto_menu: self.config.file.auto_menu,
        }
    }
}

/// Result of applying one widget (§4.6 step 3): whether it succeeded (a
/// failure rings the bell), whether it toggled `isUndo` itself (suppressing
/// the loop's own undo-stack push), and whether it was a vi-arg-digit
/// (suppressing the loop's `viRepeat` reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOutcome {
    pub ok: bool,
    pub is_undo: bool,
    pub is_vi_arg_digit: bool,
}

impl WidgetOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            is_undo: false,
            is_vi_arg_digit: false,
        }
    }

    pub fn failure() -> Self {
        Self {
            ok: false,
            is_undo: false,
            is_vi_arg_digit: false,
        }
    }

    pub fn undo_marker() -> Self {
        Self {
            ok: true,
            is_undo: true,
            is_vi_arg_digit: false,
        }
    }

    pub fn vi_arg_digit() -> Self {
        Self {
            ok: true,
            is_undo: false,
            is_vi_arg_digit: true,
        }
    }
}

pub type WidgetFn = fn(&mut WidgetContext, &mut BindingReader, u32) -> Result<WidgetOutcome>;

/// Widget names that belong to the kill family (§4.6 "Kill-ring resets"):
/// the loop only preserves `lastKill` across one of these.
pub fn is_kill_widget(name: &str) -> bool {
    matches!(
        name,
        "kill-line"
            | "backward-kill-line"
            | "kill-whole-line"
            | "backward-kill-word"
            | "kill-word"
            | "unix-word-rubout"
            | "unix-line-discard"
    )
}

/// Widget names that belong to the yank family: the loop only preserves
/// `lastYank` (for `yank-pop` rotation) across one of these.
pub fn is_yank_widget(name: &str) -> bool {
    matches!(name, "yank" | "yank-pop")
}

/// Builds the full widget dispatch table, keyed by the names §4.7.1 and
/// `core-keymap`'s `DefaultKeymaps` both use.
pub fn build_table() -> HashMap<&'static str, WidgetFn> {
    let mut t: HashMap<&'static str, WidgetFn> = HashMap::new();
    widgets::motion::register(&mut t);
    widgets::delete::register(&mut t);
    widgets::yank::register(&mut t);
    widgets::case::register(&mut t);
    widgets::transpose::register(&mut t);
    widgets::history::register(&mut t);
    widgets::search::register(&mut t);
    widgets::vi_mode::register(&mut t);
    widgets::vi_operator::register(&mut t);
    widgets::vi_char_search::register(&mut t);
    widgets::vi_match::register(&mut t);
    widgets::insert::register(&mut t);
    widgets::control::register(&mut t);
    widgets::completion::register(&mut t);
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_the_widget_inventory() {
        let table = build_table();
        for name in [
            "backward-char",
            "forward-char",
            "beginning-of-line",
            "end-of-line",
            "backward-word",
            "forward-word",
            "kill-line",
            "kill-word",
            "yank",
            "yank-pop",
            "capitalize-word",
            "transpose-chars",
            "previous-history",
            "history-search-backward",
            "history-incremental-search-backward",
            "redisplay",
            "vi-insertion-mode",
            "vi-delete-to",
            "vi-char-search",
            "vi-match-bracket",
            "self-insert",
            "quoted-insert",
            "undo",
            "redo",
            "complete-word",
            "menu-complete",
        ] {
            assert!(table.contains_key(name), "missing widget: {name}");
        }
        assert!(!table.contains_key("accept-line"), "accept-line is handled by AcceptLineHandler, not the table");
    }

    #[test]
    fn kill_and_yank_classification() {
        assert!(is_kill_widget("kill-word"));
        assert!(!is_kill_widget("yank"));
        assert!(is_yank_widget("yank-pop"));
        assert!(!is_yank_widget("kill-line"));
    }
}

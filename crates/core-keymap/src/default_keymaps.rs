//! Static construction of the keymaps every editor instance starts with:
//! `emacs`, `emacs-meta` (reached via Escape), `emacs-ctrl-x` (reached via
//! `C-x`), `vi-insert`, `vi-command`, and `menu-select` (§2 item 9,
//! §4.9). Widget names here are the contract with `core-actions`'s
//! name -> function table; §4.7.1 enumerates the full inventory.

use crate::{Binding, KeyMap};
use core_events::{KeyEvent, KeyModifiers, KeyToken, NamedKey};

fn ch(c: char) -> KeyEvent {
    KeyEvent::plain(KeyToken::Char(c))
}
fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyToken::Char(c), KeyModifiers::CTRL)
}
fn named(n: NamedKey) -> KeyEvent {
    KeyEvent::plain(KeyToken::Named(n))
}
fn act(name: &str) -> Binding {
    Binding::Action(name.to_string())
}

/// The full set of keymaps an `EditorCore` addresses by name.
pub struct KeyMapSet {
    pub emacs: KeyMap,
    pub vi_insert: KeyMap,
    pub vi_command: KeyMap,
    pub menu_select: KeyMap,
}

impl KeyMapSet {
    pub fn by_name(&self, name: &str) -> Option<&KeyMap> {
        match name {
            "emacs" => Some(&self.emacs),
            "vi-insert" => Some(&self.vi_insert),
            "vi-command" => Some(&self.vi_command),
            "menu-select" => Some(&self.menu_select),
            _ => None,
        }
    }
}

/// Named-key bindings shared by every insertion-style mode (emacs and
/// vi-insert): motion/editing on arrows, Home/End, Backspace, Delete, Tab,
/// Enter.
fn bind_common_motion_and_editing(map: &mut KeyMap) {
    map.bind(&[named(NamedKey::Left)], act("backward-char"));
    map.bind(&[named(NamedKey::Right)], act("forward-char"));
    map.bind(&[named(NamedKey::Up)], act("up-line-or-history"));
    map.bind(&[named(NamedKey::Down)], act("down-line-or-history"));
    map.bind(&[named(NamedKey::Home)], act("beginning-of-line"));
    map.bind(&[named(NamedKey::End)], act("end-of-line"));
    map.bind(&[named(NamedKey::Backspace)], act("backward-delete-char"));
    map.bind(&[named(NamedKey::Delete)], act("delete-char"));
    map.bind(&[named(NamedKey::Enter)], act("accept-line"));
    map.bind(&[named(NamedKey::PageUp)], act("beginning-of-history"));
    map.bind(&[named(NamedKey::PageDown)], act("end-of-history"));
}

fn bind_self_insert_printables(map: &mut KeyMap) {
    for b in 0x20u8..0x7f {
        map.bind(&[ch(b as char)], act("self-insert"));
    }
}

fn build_emacs_meta() -> KeyMap {
    let mut m = KeyMap::new("emacs-meta");
    m.bind(&[ch('d')], act("kill-word"));
    m.bind(&[named(NamedKey::Backspace)], act("backward-kill-word"));
    m.bind(&[ch('b')], act("backward-word"));
    m.bind(&[ch('f')], act("forward-word"));
    m.bind(&[ch('c')], act("capitalize-word"));
    m.bind(&[ch('u')], act("upcase-word"));
    m.bind(&[ch('l')], act("downcase-word"));
    m.bind(&[ch('t')], act("transpose-words"));
    m.bind(&[ch('y')], act("yank-pop"));
    m.bind(&[ch('?')], act("possible-completions"));
    m.bind(&[ch('<')], act("beginning-of-history"));
    m.bind(&[ch('>')], act("end-of-history"));
    m.bind(&[ch('p')], act("history-search-backward"));
    m.bind(&[ch('n')], act("history-search-forward"));
    for d in '0'..='9' {
        m.bind(&[ch(d)], act("digit-argument"));
    }
    m.bind(&[ch('-')], act("digit-argument"));
    for u in 'A'..='Z' {
        m.bind(&[ch(u)], act("do-lowercase-version"));
    }
    m
}

fn build_emacs_ctrl_x() -> KeyMap {
    let mut m = KeyMap::new("emacs-ctrl-x");
    m.bind(&[ctrl('u')], act("undo"));
    m.bind(&[ctrl('r')], act("redo"));
    m.bind(&[ctrl('x')], act("exchange-point-and-mark"));
    m.bind(&[ctrl('l')], act("redisplay"));
    m
}

fn build_emacs() -> KeyMap {
    let mut m = KeyMap::new("emacs");
    bind_self_insert_printables(&mut m);
    bind_common_motion_and_editing(&mut m);
    m.bind(&[ctrl('a')], act("beginning-of-line"));
    m.bind(&[ctrl('b')], act("backward-char"));
    m.bind(&[ctrl('d')], act("exit-or-delete-char"));
    m.bind(&[ctrl('e')], act("end-of-line"));
    m.bind(&[ctrl('f')], act("forward-char"));
    m.bind(&[ctrl('g')], act("abort"));
    m.bind(&[ctrl('h')], act("backward-delete-char"));
    m.bind(&[ctrl('k')], act("kill-line"));
    m.bind(&[ctrl('l')], act("clear-screen"));
    m.bind(&[ctrl('n')], act("next-history"));
    m.bind(&[ctrl('p')], act("previous-history"));
    m.bind(&[ctrl('r')], act("history-incremental-search-backward"));
    m.bind(&[ctrl('s')], act("history-incremental-search-forward"));
    m.bind(&[ctrl('t')], act("transpose-chars"));
    m.bind(&[ctrl('u')], act("unix-line-discard"));
    m.bind(&[ctrl('w')], act("unix-word-rubout"));
    m.bind(&[ctrl('y')], act("yank"));
    m.bind(&[ctrl('_')], act("undo"));
    m.bind(&[named(NamedKey::Tab)], act("complete-word"));
    m.bind(&[named(NamedKey::Esc)], Binding::Prefix(Box::new(build_emacs_meta())));
    m.bind(&[ctrl('x')], Binding::Prefix(Box::new(build_emacs_ctrl_x())));
    m
}

fn build_vi_insert() -> KeyMap {
    let mut m = KeyMap::new("vi-insert");
    bind_self_insert_printables(&mut m);
    bind_common_motion_and_editing(&mut m);
    m.bind(&[named(NamedKey::Esc)], act("vi-movement-mode"));
    m.bind(&[named(NamedKey::Tab)], act("menu-complete-or-insert-tab"));
    m.bind(&[ctrl('v')], act("quoted-insert"));
    m.bind(&[ch(')')], act("insert-close-paren"));
    m.bind(&[ch(']')], act("insert-close-bracket"));
    m.bind(&[ch('}')], act("insert-close-brace"));
    m
}

fn build_vi_command() -> KeyMap {
    let mut m = KeyMap::new("vi-command");
    m.bind(&[ch('h')], act("backward-char"));
    m.bind(&[ch('l')], act("forward-char"));
    m.bind(&[ch(' ')], act("forward-char"));
    m.bind(&[ch('j')], act("down-line-or-history"));
    m.bind(&[ch('k')], act("up-line-or-history"));
    m.bind(&[ch('0')], act("vi-arg-digit"));
    m.bind(&[ch('$')], act("end-of-line"));
    m.bind(&[ch('^')], act("vi-first-print"));
    m.bind(&[ch('w')], act("forward-word"));
    m.bind(&[ch('b')], act("backward-word"));
    m.bind(&[ch('x')], act("vi-delete-char"));
    m.bind(&[ch('X')], act("vi-rubout"));
    m.bind(&[ch('i')], act("vi-insertion-mode"));
    m.bind(&[ch('I')], act("vi-insert-beg"));
    m.bind(&[ch('a')], act("vi-append-mode"));
    m.bind(&[ch('A')], act("vi-append-eol"));
    m.bind(&[ch('d')], act("vi-delete-to"));
    m.bind(&[ch('c')], act("vi-change-to"));
    m.bind(&[ch('y')], act("vi-yank-to"));
    m.bind(&[ch('p')], act("vi-put-after"));
    m.bind(&[ch('P')], act("vi-put-before"));
    m.bind(&[ch('u')], act("undo"));
    m.bind(&[ctrl('r')], act("redo"));
    m.bind(&[ch('s')], act("vi-substitute-char"));
    m.bind(&[ch('S')], act("vi-substitute-line"));
    m.bind(&[ch('r')], act("vi-replace-char"));
    m.bind(&[ch('f')], act("vi-char-search"));
    m.bind(&[ch('F')], act("vi-char-search"));
    m.bind(&[ch('t')], act("vi-char-search"));
    m.bind(&[ch('T')], act("vi-char-search"));
    m.bind(&[ch(';')], act("vi-repeat-char-search"));
    m.bind(&[ch(',')], act("vi-reverse-char-search"));
    m.bind(&[ch('%')], act("vi-match-bracket"));
    for d in '1'..='9' {
        m.bind(&[ch(d)], act("vi-arg-digit"));
    }
    m.bind(&[named(NamedKey::Enter)], act("accept-line"));
    m.bind(&[ctrl('d')], act("exit-or-delete-char"));
    m.bind(&[named(NamedKey::Left)], act("backward-char"));
    m.bind(&[named(NamedKey::Right)], act("forward-char"));
    m.bind(&[named(NamedKey::Up)], act("up-line-or-history"));
    m.bind(&[named(NamedKey::Down)], act("down-line-or-history"));
    m
}

fn build_menu_select() -> KeyMap {
    let mut m = KeyMap::new("menu-select");
    m.bind(&[named(NamedKey::Tab)], act("menu-complete"));
    m.bind(&[named(NamedKey::BackTab)], act("reverse-menu-complete"));
    m.bind(&[named(NamedKey::Left)], act("menu-left"));
    m.bind(&[named(NamedKey::Right)], act("menu-right"));
    m.bind(&[named(NamedKey::Up)], act("menu-up"));
    m.bind(&[named(NamedKey::Down)], act("menu-down"));
    m.bind(&[ctrl('l')], act("clear-screen"));
    m.bind(&[named(NamedKey::Backspace)], act("backward-delete-char"));
    m
}

impl Default for KeyMapSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl KeyMapSet {
    pub fn standard() -> Self {
        Self {
            emacs: build_emacs(),
            vi_insert: build_vi_insert(),
            vi_command: build_vi_command(),
            menu_select: build_menu_select(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lookup;

    #[test]
    fn emacs_binds_ctrl_a_to_beginning_of_line() {
        let set = KeyMapSet::standard();
        assert_eq!(
            set.emacs.lookup(&[ctrl('a')]),
            Lookup::Bound(&act("beginning-of-line"))
        );
    }

    #[test]
    fn emacs_escape_d_kills_word_via_meta_prefix() {
        let set = KeyMapSet::standard();
        match set.emacs.step(named(NamedKey::Esc)) {
            Lookup::Prefix(meta) => {
                assert_eq!(meta.lookup(&[ch('d')]), Lookup::Bound(&act("kill-word")));
            }
            other => panic!("expected prefix, got {other:?}"),
        }
    }

    #[test]
    fn vi_command_binds_digits_to_arg_digit() {
        let set = KeyMapSet::standard();
        assert_eq!(
            set.vi_command.lookup(&[ch('5')]),
            Lookup::Bound(&act("vi-arg-digit"))
        );
    }

    #[test]
    fn emacs_meta_p_binds_history_search_backward() {
        let set = KeyMapSet::standard();
        match set.emacs.step(named(NamedKey::Esc)) {
            Lookup::Prefix(meta) => {
                assert_eq!(meta.lookup(&[ch('p')]), Lookup::Bound(&act("history-search-backward")));
                assert_eq!(meta.lookup(&[ch('n')]), Lookup::Bound(&act("history-search-forward")));
            }
            other => panic!("expected prefix, got {other:?}"),
        }
    }

    #[test]
    fn emacs_ctrl_x_ctrl_l_binds_redisplay() {
        let set = KeyMapSet::standard();
        match set.emacs.step(ctrl('x')) {
            Lookup::Prefix(ctrl_x) => {
                assert_eq!(ctrl_x.lookup(&[ctrl('l')]), Lookup::Bound(&act("redisplay")));
            }
            other => panic!("expected prefix, got {other:?}"),
        }
    }

    #[test]
    fn by_name_resolves_known_maps_only() {
        let set = KeyMapSet::standard();
        assert!(set.by_name("vi-command").is_some());
        assert!(set.by_name("nonexistent").is_none());
    }
}

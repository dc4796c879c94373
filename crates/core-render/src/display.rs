//! The incremental differential redisplay (§4.5).
//!
//! `Display::update` is handed the previous frame's wrapped lines
//! (`old_lines`) and the newly computed ones, diffs each row by
//! common-prefix/common-suffix (the same trimming heuristic the teacher's
//! `partial_diff` module used, generalized from viewport line hashing to a
//! direct line-diff since there's no cache to warm here — every redraw
//! immediately follows a widget dispatch), and emits the shortest command
//! sequence to reconcile the two, preferring `insert_character`/
//! `delete_character` over a full rewrite when the terminal supports them.

use crate::writer::Writer;
use anyhow::Result;
use core_actions::Redisplay;
use core_completion::{Candidate, ColumnLayout, Columnizer};
use core_config::BellStyle;
use core_state::EditorState;
use core_terminal::TerminalCapabilities;
use core_text::width::display_width_at;
use crossterm::terminal;

fn display_width(s: &str) -> u16 {
    let mut col = 0usize;
    for c in s.chars() {
        col += display_width_at(c, col, usize::MAX);
    }
    col as u16
}

/// Renders a single code point the way it will actually occupy columns:
/// tabs expand to literal spaces (so the diff's column math matches what's
/// on screen) and control characters print as `^X` (§4.5's width model).
fn render_glyph(c: char, col: usize, tab_width: usize) -> String {
    match c {
        '\t' => {
            let tab_width = tab_width.max(1);
            " ".repeat(tab_width - (col % tab_width))
        }
        c if (c as u32) < 0x20 => format!("^{}", ((c as u8) + 0x40) as char),
        c => c.to_string(),
    }
}

/// Wraps `prompt` + the (optionally masked) buffer contents to `cols`
/// columns, returning the wrapped rows and the cursor's `(row, col)`
/// inside them.
fn build_frame(state: &EditorState, cols: u16, tab_width: usize) -> (Vec<String>, (u16, u16)) {
    let cols = cols.max(1) as usize;
    let prompt_chars: Vec<char> = state.prompt.chars().collect();
    let buf_chars: Vec<char> = match state.mask {
        Some(mask) => vec![mask; state.buf.len()],
        None => state.buf.as_slice().to_vec(),
    };
    let cursor_offset = prompt_chars.len() + state.buf.cursor();

    let mut lines: Vec<String> = vec![String::new()];
    let mut col = 0usize;
    let mut cursor = (0u16, 0u16);

    let total = prompt_chars.len() + buf_chars.len();
    for (i, &c) in prompt_chars.iter().chain(buf_chars.iter()).enumerate() {
        if i == cursor_offset {
            cursor = ((lines.len() - 1) as u16, col as u16);
        }
        if c == '\n' {
            lines.push(String::new());
            col = 0;
            continue;
        }
        let w = display_width_at(c, col, tab_width);
        if col + w > cols && col > 0 {
            lines.push(String::new());
            col = 0;
        }
        lines.last_mut().unwrap().push_str(&render_glyph(c, col, tab_width));
        col += w;
    }
    if cursor_offset == total {
        cursor = ((lines.len() - 1) as u16, col as u16);
    }
    (lines, cursor)
}

/// Common-prefix/common-suffix split of two rows, in chars.
fn prefix_suffix_len(old: &[char], new: &[char]) -> (usize, usize) {
    let max_prefix = old.len().min(new.len());
    let prefix = (0..max_prefix).take_while(|&i| old[i] == new[i]).count();
    let max_suffix = old.len().min(new.len()) - prefix;
    let suffix = (0..max_suffix)
        .take_while(|&i| old[old.len() - 1 - i] == new[new.len() - 1 - i])
        .count();
    (prefix, suffix)
}

pub struct Display {
    caps: TerminalCapabilities,
    tab_width: usize,
    old_lines: Vec<String>,
    /// Cursor position relative to the first row of `old_lines`.
    phys_row: u16,
    phys_col: u16,
}

impl Display {
    pub fn new(tab_width: usize) -> Self {
        Self {
            caps: TerminalCapabilities::detect(),
            tab_width: tab_width.max(1),
            old_lines: Vec::new(),
            phys_row: 0,
            phys_col: 0,
        }
    }

    pub fn with_capabilities(tab_width: usize, caps: TerminalCapabilities) -> Self {
        Self {
            caps,
            tab_width: tab_width.max(1),
            old_lines: Vec::new(),
            phys_row: 0,
            phys_col: 0,
        }
    }

    fn goto_row(&mut self, w: &mut Writer, row: u16) {
        if row < self.old_lines.len() as u16 {
            if row > self.phys_row {
                w.down(row - self.phys_row);
            } else if row < self.phys_row {
                w.up(self.phys_row - row);
            }
            w.carriage_return();
        } else {
            // This row didn't exist on screen before this frame — the
            // per-row loop creates rows one at a time in order, so there's
            // always exactly one new row to open with a literal newline
            // (cursor-down has nothing to land on yet).
            w.print("\r\n");
        }
        self.phys_row = row;
        self.phys_col = 0;
    }

    fn goto_col(&mut self, w: &mut Writer, col: u16) {
        if col > self.phys_col {
            w.right(col - self.phys_col);
        } else if col < self.phys_col {
            w.left(self.phys_col - col);
        }
        self.phys_col = col;
    }

    fn diff_row(&mut self, w: &mut Writer, old: &str, new: &str, row: u16) {
        if old == new {
            return;
        }
        let old_chars: Vec<char> = old.chars().collect();
        let new_chars: Vec<char> = new.chars().collect();
        let (prefix, suffix) = prefix_suffix_len(&old_chars, &new_chars);
        let old_mid = &old_chars[prefix..old_chars.len() - suffix];
        let new_mid = &new_chars[prefix..new_chars.len() - suffix];

        self.goto_row(w, row);
        let prefix_col = display_width(&old_chars[..prefix].iter().collect::<String>());
        self.goto_col(w, prefix_col);

        if old_mid.is_empty() && !new_mid.is_empty() {
            if self.caps.insert_character {
                let text: String = new_mid.iter().collect();
                w.insert_chars(display_width(&text));
                w.print(&text);
                self.phys_col += display_width(&text);
            } else {
                // No insert-character support: the shifted suffix has to be
                // rewritten too, or it would be overwritten in place rather
                // than pushed right.
                let rest: String = new_chars[prefix..].iter().collect();
                w.print(&rest);
                self.phys_col += display_width(&rest);
            }
        } else if new_mid.is_empty() && !old_mid.is_empty() {
            if self.caps.delete_character {
                let n = display_width(&old_mid.iter().collect::<String>());
                w.delete_chars(n);
            } else {
                let rest: String = new_chars[prefix..].iter().collect();
                w.print(&rest);
                self.phys_col += display_width(&rest);
                w.clear_to_eol();
            }
        } else {
            let old_w = display_width(&old_mid.iter().collect::<String>());
            let new_w = display_width(&new_mid.iter().collect::<String>());
            if old_w == new_w {
                let text: String = new_mid.iter().collect();
                w.print(&text);
                self.phys_col += new_w;
            } else {
                let rest: String = new_chars[prefix..].iter().collect();
                w.print(&rest);
                self.phys_col += display_width(&rest);
                if new_w < old_w || new_chars.len() < old_chars.len() {
                    w.clear_to_eol();
                }
            }
        }
    }

    /// §4.5's `update(newLines, targetCursor)`.
    fn update(&mut self, new_lines: Vec<String>, target: (u16, u16)) -> Result<()> {
        let mut w = Writer::new();
        let rows = self.old_lines.len().max(new_lines.len());

        for row in 0..rows as u16 {
            let old = self.old_lines.get(row as usize).map(String::as_str).unwrap_or("");
            let new = new_lines.get(row as usize).map(String::as_str);
            match new {
                Some(new) => self.diff_row(&mut w, old, new, row),
                None => {
                    self.goto_row(&mut w, row);
                    w.clear_to_eol();
                }
            }
        }

        self.old_lines = new_lines;
        self.goto_row(&mut w, target.0);
        self.goto_col(&mut w, target.1);
        w.flush()
    }
}

impl Redisplay for Display {
    fn redraw(&mut self, state: &EditorState) -> Result<()> {
        let (cols, _rows) = terminal::size().unwrap_or((80, 24));
        let (lines, cursor) = build_frame(state, cols, self.tab_width);
        self.update(lines, cursor)
    }

    fn show_candidates(&mut self, candidates: &[Candidate]) -> Result<()> {
        let (cols, _rows) = terminal::size().unwrap_or((80, 24));
        let ColumnLayout { lines } = Columnizer::layout(candidates, cols as usize, true, false);

        let mut w = Writer::new();
        self.goto_row(&mut w, self.old_lines.len() as u16);
        for line in &lines {
            w.print("\r\n");
            w.print(line);
        }
        w.flush()?;

        // The candidate listing now occupies rows below the last drawn
        // frame; force the next redraw to treat everything as new.
        self.old_lines.clear();
        self.phys_row = 0;
        self.phys_col = 0;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let mut w = Writer::new();
        w.clear_all();
        w.flush()?;
        self.old_lines.clear();
        self.phys_row = 0;
        self.phys_col = 0;
        Ok(())
    }

    fn bell(&mut self, style: BellStyle) -> Result<()> {
        let mut w = Writer::new();
        match style {
            BellStyle::None => return Ok(()),
            BellStyle::Audible => w.bell(),
            BellStyle::Visible => {
                if self.caps.flash {
                    w.flash();
                } else {
                    w.bell();
                }
            }
        }
        w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(prompt: &str, text: &str, cursor: usize) -> EditorState {
        let mut s = EditorState::new(prompt, "emacs");
        s.buf = core_text::Buffer::from_str(text);
        s.buf.set_cursor(cursor);
        s
    }

    #[test]
    fn prefix_suffix_split_finds_the_inserted_middle() {
        let old: Vec<char> = "hello".chars().collect();
        let new: Vec<char> = "heallo".chars().collect();
        let (prefix, suffix) = prefix_suffix_len(&old, &new);
        assert_eq!(prefix, 2);
        assert_eq!(suffix, 3);
    }

    #[test]
    fn build_frame_places_cursor_after_the_prompt() {
        let s = state("> ", "hi", 1);
        let (lines, cursor) = build_frame(&s, 80, 8);
        assert_eq!(lines, vec!["> hi".to_string()]);
        assert_eq!(cursor, (0, 3));
    }

    #[test]
    fn build_frame_wraps_at_the_terminal_width() {
        let s = state("", "abcdef", 6);
        let (lines, cursor) = build_frame(&s, 4, 8);
        assert_eq!(lines, vec!["abcd".to_string(), "ef".to_string()]);
        assert_eq!(cursor, (1, 2));
    }

    #[test]
    fn control_characters_render_with_caret_notation() {
        let s = state("", "\x01", 1);
        let (lines, _) = build_frame(&s, 80, 8);
        assert_eq!(lines, vec!["^A".to_string()]);
    }

    #[test]
    fn masked_buffer_hides_its_contents() {
        let mut s = state("pw: ", "secret", 6);
        s.mask = Some('*');
        let (lines, _) = build_frame(&s, 80, 8);
        assert_eq!(lines, vec!["pw: ******".to_string()]);
    }

    #[test]
    fn redraw_twice_only_diffs_the_changed_tail() {
        let mut d = Display::new(8);
        let s1 = state("> ", "hi", 2);
        d.redraw(&s1).unwrap();
        assert_eq!(d.old_lines, vec!["> hi".to_string()]);

        let s2 = state("> ", "hit", 3);
        d.redraw(&s2).unwrap();
        assert_eq!(d.old_lines, vec!["> hit".to_string()]);
    }
}

//! Display width model.
//!
//! The buffer is code-point indexed, so width is computed one `char` at a
//! time rather than per grapheme cluster: [`char_width`] layers a small set
//! of emoji/CJK heuristics on top of `unicode_width::UnicodeWidthChar`
//! (Width Precedence Order: runtime probe override when the `term-probe`
//! feature is enabled, then the classifier below, then
//! `UnicodeWidthChar::width`). [`line_display_width`] adds the tab-stop and
//! control-character handling the classifier alone doesn't cover.

use unicode_width::UnicodeWidthChar;

/// Default tab stop width when none is configured (§6 `TAB_WIDTH`).
pub const DEFAULT_TAB_WIDTH: usize = 8;

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_variation_selector(c: char) -> bool {
    c == '\u{FE0F}' || c == '\u{FE0E}'
}

fn is_zwj(c: char) -> bool {
    c == '\u{200D}'
}

fn is_extended_pictographic(c: char) -> bool {
    matches!(c as u32,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F000..=0x1F0FF
    )
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF
    )
}

/// Terminals commonly render a gear glyph followed by the emoji variation
/// selector at width 1 even though some wcwidth tables call it 2; this
/// override keeps the cached redisplay in sync with what actually lands on
/// screen.
fn static_override(c: char) -> Option<u16> {
    if c == '\u{2699}' { Some(1) } else { None }
}

/// Display width of a single code point, in terminal columns.
pub fn char_width(c: char) -> u16 {
    #[cfg(feature = "term-probe")]
    if let Some(w) = crate::width_probe::runtime_override_width(c) {
        return w;
    }

    if let Some(w) = static_override(c) {
        return w;
    }

    if is_variation_selector(c) || is_zwj(c) || is_combining_mark(c) {
        return 0;
    }
    if is_regional_indicator(c) || is_skin_tone_modifier(c) {
        return 2;
    }
    if is_extended_pictographic(c) {
        return 2;
    }

    UnicodeWidthChar::width(c).unwrap_or(0) as u16
}

/// Width of `c` as it would be rendered on a line, accounting for the two
/// control-character conventions §4.5/§9 call out: tabs expand to the next
/// stop modulo `tab_width`, and control characters below `0x20` render as
/// `^X` (width 2).
pub fn display_width_at(c: char, col: usize, tab_width: usize) -> usize {
    match c {
        '\t' => {
            let tab_width = tab_width.max(1);
            tab_width - (col % tab_width)
        }
        c if (c as u32) < 0x20 => 2,
        c => char_width(c) as usize,
    }
}

/// Total display width of a sequence of chars starting at column 0.
pub fn line_display_width(chars: &[char], tab_width: usize) -> usize {
    let mut col = 0usize;
    for &c in chars {
        col += display_width_at(c, col, tab_width);
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_width_one() {
        assert_eq!(char_width('a'), 1);
    }

    #[test]
    fn cjk_is_width_two() {
        assert_eq!(char_width('\u{6F22}'), 2); // 漢
    }

    #[test]
    fn emoji_is_width_two() {
        assert_eq!(char_width('\u{1F600}'), 2); // 😀
    }

    #[test]
    fn variation_selector_is_width_zero() {
        assert_eq!(char_width('\u{FE0F}'), 0);
    }

    #[test]
    fn gear_override_forced_to_one() {
        assert_eq!(char_width('\u{2699}'), 1);
    }

    #[test]
    fn tab_expands_to_next_stop() {
        assert_eq!(display_width_at('\t', 0, 8), 8);
        assert_eq!(display_width_at('\t', 3, 8), 5);
        assert_eq!(display_width_at('\t', 8, 8), 8);
    }

    #[test]
    fn control_char_width_is_two() {
        assert_eq!(display_width_at('\u{1}', 0, 8), 2);
    }

    #[test]
    fn line_width_sums_with_tabs() {
        let chars: Vec<char> = "a\tb".chars().collect();
        assert_eq!(line_display_width(&chars, 8), 1 + 7 + 1);
    }
}

//! The Parser collaborator (§6): `parse(line, cursor) -> ParsedLine |
//! IncompleteError(missing) | SyntaxError`.
//!
//! §6.1 of the expanded spec places this trait in `core-model`, but both
//! `accept-line` (core-actions/core-model) *and* the completion engine here
//! need the same `ParsedLine` currency, and `core-model` depends on
//! `core-actions` which depends on `core-completion` — putting `Parser` in
//! `core-model` would create a cycle. It lives here instead, with
//! `core-model` re-exporting it for the accept-line path; see DESIGN.md.

/// A line parsed into the word under (or before) the cursor plus the full
/// word list, matching §6's `ParsedLine` exposure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The word the cursor is inside (or immediately after).
    pub word: String,
    /// Cursor offset (in chars) within `word`.
    pub word_cursor: usize,
    /// Index of `word` within `words`.
    pub word_index: usize,
    pub words: Vec<String>,
    pub line: String,
    /// Cursor offset (in chars) within `line`.
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Complete(ParsedLine),
    /// The external parser needs another line before it can finish (e.g. an
    /// unterminated quote); `missing` describes what it expects.
    Incomplete(String),
    Syntax,
}

pub trait Parser {
    fn parse(&self, line: &str, cursor: usize) -> ParseOutcome;
}

/// Splits on ASCII whitespace — adequate for exercising the editor
/// standalone without a real shell grammar (a full shell language is an
/// explicit Non-goal, §1).
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceParser;

impl Parser for WhitespaceParser {
    fn parse(&self, line: &str, cursor: usize) -> ParseOutcome {
        let chars: Vec<char> = line.chars().collect();
        let cursor = cursor.min(chars.len());

        let mut words = Vec::new();
        let mut bounds = Vec::new(); // (start, end) char offsets per word
        let mut start: Option<usize> = None;
        for (i, &c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                if let Some(s) = start.take() {
                    words.push(chars[s..i].iter().collect::<String>());
                    bounds.push((s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            words.push(chars[s..].iter().collect::<String>());
            bounds.push((s, chars.len()));
        }

        // Find which word (if any) the cursor sits inside; if the cursor is
        // in inter-word whitespace, treat it as starting a new empty word at
        // that position (so completion can still offer candidates).
        let mut word_index = bounds.len();
        let mut word = String::new();
        let mut word_cursor = 0;
        for (i, &(s, e)) in bounds.iter().enumerate() {
            if cursor >= s && cursor <= e {
                word_index = i;
                word = words[i].clone();
                word_cursor = cursor - s;
                break;
            }
        }
        if word_index == bounds.len() {
            // cursor past all words, or in leading/trailing whitespace.
            words.push(String::new());
        }

        ParseOutcome::Complete(ParsedLine {
            word,
            word_cursor,
            word_index,
            words,
            line: line.to_string(),
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_locates_cursor_word() {
        let p = WhitespaceParser;
        let ParseOutcome::Complete(parsed) = p.parse("git commit -m", 13) else {
            panic!("expected Complete");
        };
        assert_eq!(parsed.words, vec!["git", "commit", "-m"]);
        assert_eq!(parsed.word, "-m");
        assert_eq!(parsed.word_index, 2);
        assert_eq!(parsed.word_cursor, 2);
    }

    #[test]
    fn cursor_mid_word_reports_partial_offset() {
        let p = WhitespaceParser;
        let ParseOutcome::Complete(parsed) = p.parse("foo", 2) else {
            panic!("expected Complete");
        };
        assert_eq!(parsed.word, "foo");
        assert_eq!(parsed.word_cursor, 2);
    }

    #[test]
    fn empty_line_yields_empty_word() {
        let p = WhitespaceParser;
        let ParseOutcome::Complete(parsed) = p.parse("", 0) else {
            panic!("expected Complete");
        };
        assert_eq!(parsed.word, "");
        assert_eq!(parsed.words, vec![""]);
    }
}

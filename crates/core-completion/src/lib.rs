//! Completion (§4.8, §4.9, §4.11): the matcher pipeline, unambiguous-prefix
//! and menu-mode state machine, and the word-boundary parser they share with
//! `accept-line`.
//!
//! `Parser`/`ParsedLine` live here rather than in `core-model` — see
//! `parser.rs` for why — and `core-model` re-exports them for the
//! accept-line path.

pub mod columnizer;
pub mod engine;
pub mod matchers;
pub mod menu;
pub mod parser;

pub use columnizer::{ColumnLayout, Columnizer};
pub use engine::{CompletionEngine, CompletionOptions, CompletionOutcome, CompletionRequest};
pub use matchers::{levenshtein, Matcher, PrefixMatcher, SubstringMatcher, TypoMatcher};
pub use menu::MenuState;
pub use parser::{ParseOutcome, ParsedLine, Parser, WhitespaceParser};

use thiserror::Error;

/// One completion candidate offered by a [`Completer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The text inserted into the buffer on acceptance.
    pub value: String,
    /// The text shown in listings; defaults to `value` when not set
    /// explicitly (e.g. a candidate whose display differs from what gets
    /// inserted, such as a quoted filename).
    pub display: String,
    /// Optional group label, used by `Columnizer` to print `GROUP` headers.
    pub group: Option<String>,
    /// Optional one-line description shown alongside `display` in listings.
    pub description: Option<String>,
    /// A character appended after `value` on acceptance (e.g. `/` for a
    /// directory, a trailing space for a command name).
    pub suffix: Option<char>,
    /// Stable identity used for candidate merging across `Completer`
    /// invocations (§4.8 step 1: "merge by key"); defaults to `value`.
    pub key: Option<String>,
    /// Whether this candidate is itself eligible for completion recursion
    /// (unused by the default completers; reserved for nested completion).
    pub complete: bool,
}

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let display = value.clone();
        Self {
            value,
            display,
            group: None,
            description: None,
            suffix: None,
            key: None,
            complete: false,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn with_suffix(mut self, suffix: char) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Merge key, falling back to `value` when none was set explicitly.
    pub fn merge_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completer produced no candidates")]
    NoCandidates,
    #[error("completer collaborator failed: {0}")]
    CompleterFailed(String),
}

/// The completion collaborator (§6): given the word under the cursor and the
/// full line, returns every candidate that could replace it.
pub trait Completer {
    fn complete(&self, parsed: &ParsedLine) -> Result<Vec<Candidate>, CompletionError>;
}

/// No completions, ever — the default when no collaborator is wired up
/// (mirrors `core_state::NoClipboard`: a null-object default rather than an
/// `Option<Box<dyn Completer>>` threaded through every call site).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCompleter;

impl Completer for NoopCompleter {
    fn complete(&self, _parsed: &ParsedLine) -> Result<Vec<Candidate>, CompletionError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_new_defaults_display_to_value() {
        let c = Candidate::new("foo");
        assert_eq!(c.display, "foo");
        assert_eq!(c.merge_key(), "foo");
    }

    #[test]
    fn candidate_builders_override_fields() {
        let c = Candidate::new("foo").with_display("Foo").with_suffix('/');
        assert_eq!(c.display, "Foo");
        assert_eq!(c.suffix, Some('/'));
    }

    #[test]
    fn noop_completer_returns_empty() {
        let parsed = ParsedLine {
            word: "f".into(),
            word_cursor: 1,
            word_index: 0,
            words: vec!["f".into()],
            line: "f".into(),
            cursor: 1,
        };
        assert_eq!(NoopCompleter.complete(&parsed).unwrap(), Vec::new());
    }
}

//! `CompletionEngine` (§4.8): merges, matches, and resolves a candidate list
//! against the word under the cursor.

use crate::matchers::{Matcher, PrefixMatcher, SubstringMatcher, TypoMatcher};
use crate::{Candidate, ParsedLine};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRequest {
    /// Plain `complete-word`: unambiguous-prefix extension, or list/menu per
    /// the `AUTO_*` options.
    Complete,
    /// `possible-completions`: always list.
    List,
    /// `menu-complete`/`delete-char-or-list` with `MENU`: always enter menu
    /// mode directly.
    Menu,
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub case_insensitive: bool,
    pub errors: usize,
    pub list_max: usize,
    pub auto_list: bool,
    pub auto_menu: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            errors: 2,
            list_max: 100,
            auto_list: false,
            auto_menu: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    NoCandidates,
    /// The sole or unambiguous-prefix match equals the word already typed;
    /// nothing to insert (§8 boundary case).
    NoChange,
    Single {
        value: String,
        append_space: bool,
    },
    /// Unambiguous common prefix extended the word; `candidates` are offered
    /// for an immediately following list/menu per `AUTO_LIST`/`AUTO_MENU`.
    Prefix {
        value: String,
        candidates: Vec<Candidate>,
    },
    List {
        candidates: Vec<Candidate>,
    },
    Menu {
        candidates: Vec<Candidate>,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionEngine;

impl CompletionEngine {
    pub fn run(
        parsed: &ParsedLine,
        candidates: &[Candidate],
        request: CompletionRequest,
        options: &CompletionOptions,
    ) -> CompletionOutcome {
        let merged = Self::merge(candidates);
        let word = &parsed.word[..parsed.word_cursor.min(parsed.word.len())];

        let matched = Self::match_candidates(word, &merged, options);
        if matched.is_empty() {
            return CompletionOutcome::NoCandidates;
        }

        if matched.len() == 1 {
            let c = matched[0];
            if c.value == parsed.word {
                return CompletionOutcome::NoChange;
            }
            return CompletionOutcome::Single {
                value: c.value.clone(),
                append_space: c.complete,
            };
        }

        match request {
            CompletionRequest::List => CompletionOutcome::List {
                candidates: matched.into_iter().cloned().collect(),
            },
            CompletionRequest::Menu => CompletionOutcome::Menu {
                candidates: matched.into_iter().cloned().collect(),
            },
            CompletionRequest::Complete => {
                if options.auto_menu {
                    return CompletionOutcome::Menu {
                        candidates: matched.into_iter().cloned().collect(),
                    };
                }
                let prefix = Self::longest_common_prefix(&matched, options.case_insensitive);
                if prefix.len() > parsed.word.len() && prefix.starts_with(&parsed.word) {
                    CompletionOutcome::Prefix {
                        value: prefix,
                        candidates: matched.into_iter().cloned().collect(),
                    }
                } else if options.auto_list {
                    CompletionOutcome::List {
                        candidates: matched.into_iter().cloned().collect(),
                    }
                } else {
                    CompletionOutcome::NoChange
                }
            }
        }
    }

    /// §4.8 step 5: candidates sharing a non-null key collapse into one,
    /// value from the lexicographically-first, display space-joined.
    fn merge(candidates: &[Candidate]) -> Vec<Candidate> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&Candidate>> = HashMap::new();
        for c in candidates {
            let key = c.merge_key().to_string();
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(c);
        }

        order
            .into_iter()
            .map(|key| {
                let members = &groups[&key];
                if members.len() == 1 {
                    return members[0].clone();
                }
                let mut sorted: Vec<&&Candidate> = members.iter().collect();
                sorted.sort_by(|a, b| a.value.cmp(&b.value));
                let value = sorted[0].value.clone();
                let display = members
                    .iter()
                    .map(|c| c.display.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let mut merged = (*sorted[0]).clone();
                merged.value = value;
                merged.display = display;
                merged
            })
            .collect()
    }

    fn match_candidates<'a>(
        word: &str,
        candidates: &'a [Candidate],
        options: &CompletionOptions,
    ) -> Vec<&'a Candidate> {
        let prefix = PrefixMatcher.matches(word, candidates, options.case_insensitive);
        if !prefix.is_empty() {
            return prefix;
        }
        let substring = SubstringMatcher.matches(word, candidates, options.case_insensitive);
        if !substring.is_empty() {
            return substring;
        }
        TypoMatcher { errors: options.errors }.matches(word, candidates, options.case_insensitive)
    }

    fn longest_common_prefix(candidates: &[&Candidate], case_insensitive: bool) -> String {
        let fold = |s: &str| {
            if case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let mut iter = candidates.iter();
        let first = match iter.next() {
            Some(c) => fold(&c.value),
            None => return String::new(),
        };
        let mut prefix: Vec<char> = first.chars().collect();
        for c in iter {
            let chars: Vec<char> = fold(&c.value).chars().collect();
            let common = prefix.iter().zip(chars.iter()).take_while(|(a, b)| a == b).count();
            prefix.truncate(common);
            if prefix.is_empty() {
                break;
            }
        }
        // Use the original-case value for display purposes when not folding.
        if case_insensitive {
            prefix.into_iter().collect()
        } else {
            candidates[0].value.chars().take(prefix.len()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(word: &str) -> ParsedLine {
        ParsedLine {
            word: word.to_string(),
            word_cursor: word.len(),
            word_index: 0,
            words: vec![word.to_string()],
            line: word.to_string(),
            cursor: word.len(),
        }
    }

    #[test]
    fn single_unambiguous_match_replaces_word() {
        let cands = vec![Candidate::new("foobar")];
        let out = CompletionEngine::run(
            &parsed("foo"),
            &cands,
            CompletionRequest::Complete,
            &CompletionOptions::default(),
        );
        assert_eq!(
            out,
            CompletionOutcome::Single {
                value: "foobar".to_string(),
                append_space: false
            }
        );
    }

    #[test]
    fn exact_match_is_no_change() {
        let cands = vec![Candidate::new("foo")];
        let out = CompletionEngine::run(
            &parsed("foo"),
            &cands,
            CompletionRequest::Complete,
            &CompletionOptions::default(),
        );
        assert_eq!(out, CompletionOutcome::NoChange);
    }

    #[test]
    fn ambiguous_matches_extend_common_prefix() {
        let cands = vec![Candidate::new("foobar"), Candidate::new("foobaz")];
        let out = CompletionEngine::run(
            &parsed("foo"),
            &cands,
            CompletionRequest::Complete,
            &CompletionOptions::default(),
        );
        assert_eq!(
            out,
            CompletionOutcome::Prefix {
                value: "fooba".to_string(),
                candidates: cands,
            }
        );
    }

    #[test]
    fn no_common_prefix_without_auto_list_is_no_change() {
        let cands = vec![Candidate::new("alpha"), Candidate::new("beta")];
        let parsed_line = ParsedLine {
            word: "".into(),
            word_cursor: 0,
            word_index: 0,
            words: vec!["".into()],
            line: "".into(),
            cursor: 0,
        };
        let out = CompletionEngine::run(
            &parsed_line,
            &cands,
            CompletionRequest::Complete,
            &CompletionOptions::default(),
        );
        assert_eq!(out, CompletionOutcome::NoChange);
    }

    #[test]
    fn list_request_always_lists_multiple_matches() {
        let cands = vec![Candidate::new("foobar"), Candidate::new("foobaz")];
        let out = CompletionEngine::run(
            &parsed("foo"),
            &cands,
            CompletionRequest::List,
            &CompletionOptions::default(),
        );
        assert_eq!(out, CompletionOutcome::List { candidates: cands });
    }

    #[test]
    fn no_candidates_reported_when_nothing_matches() {
        let cands = vec![Candidate::new("zzz")];
        let out = CompletionEngine::run(
            &parsed("abc"),
            &cands,
            CompletionRequest::Complete,
            &CompletionOptions::default(),
        );
        assert_eq!(out, CompletionOutcome::NoCandidates);
    }

    #[test]
    fn merge_collapses_candidates_sharing_a_key() {
        let mut a = Candidate::new("b_impl").with_display("impl (a)");
        a.key = Some("impl".into());
        let mut b = Candidate::new("a_impl").with_display("impl (b)");
        b.key = Some("impl".into());
        let merged = CompletionEngine::merge(&[a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, "a_impl");
        assert_eq!(merged[0].display, "impl (a) impl (b)");
    }
}

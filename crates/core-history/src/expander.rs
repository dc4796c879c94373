//! Event expansion (§4.10): `!!`, `!n`, `!-n`, `!?str?`, `!$`, `!str`, and
//! `^a^b` at column 0.
//!
//! A failed designator fails the whole expansion (§4.10, §7: "recoverable;
//! ring bell, clear buffer, show error message, do not accept") — the caller
//! (`core-model`'s accept-line handler) decides what to do with the
//! [`ExpansionError`]; this module only recognizes designators and resolves
//! them against a [`History`].

use crate::History;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpansionError {
    #[error("unknown history designator '!{0}'")]
    UnknownDesignator(char),
    #[error("no such history event: {0}")]
    NoSuchEvent(String),
    #[error("no previous substitution")]
    NoPreviousSubstitution,
}

/// Expands every `!`-designator and column-0 `^a^b` substitution in `line`
/// against `history`. A literal `\!` is left as `!` and never triggers
/// expansion, which is what makes expansion idempotent on already-escaped
/// input (§8 law).
pub struct EventExpander;

impl EventExpander {
    pub fn expand(line: &str, history: &dyn History) -> Result<String, ExpansionError> {
        if let Some(rest) = line.strip_prefix('^') {
            return Self::expand_caret_substitution(rest, history);
        }
        let chars: Vec<char> = line.chars().collect();
        let mut out = String::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '\\' && i + 1 < chars.len() && chars[i + 1] == '!' {
                out.push('!');
                i += 2;
                continue;
            }
            if c == '!' {
                let (expansion, consumed) = Self::expand_designator(&chars[i + 1..], history)?;
                out.push_str(&expansion);
                i += 1 + consumed;
                continue;
            }
            out.push(c);
            i += 1;
        }
        Ok(out)
    }

    /// Resolves the designator immediately following a `!` at `rest[0..]`.
    /// Returns the replacement text and how many characters of `rest` it
    /// consumed (not counting the leading `!` itself).
    fn expand_designator(
        rest: &[char],
        history: &dyn History,
    ) -> Result<(String, usize), ExpansionError> {
        match rest.first() {
            None => Err(ExpansionError::UnknownDesignator(' ')),
            Some('!') => {
                let entry = Self::most_recent(history).ok_or_else(|| {
                    ExpansionError::NoSuchEvent("!!".to_string())
                })?;
                Ok((entry.to_string(), 1))
            }
            Some('$') => {
                let entry = Self::most_recent(history)
                    .ok_or_else(|| ExpansionError::NoSuchEvent("!$".to_string()))?;
                let word = last_word(entry)
                    .ok_or_else(|| ExpansionError::NoSuchEvent("!$".to_string()))?;
                Ok((word.to_string(), 1))
            }
            Some('-') => {
                let (digits, n) = take_digits(&rest[1..]);
                if digits.is_empty() {
                    return Err(ExpansionError::UnknownDesignator('-'));
                }
                let back: usize = digits.parse().unwrap_or(0);
                let len = history.len();
                if back == 0 || back > len {
                    return Err(ExpansionError::NoSuchEvent(format!("!-{digits}")));
                }
                let entry = history
                    .get(len - back)
                    .ok_or_else(|| ExpansionError::NoSuchEvent(format!("!-{digits}")))?;
                Ok((entry.to_string(), 1 + n))
            }
            Some(d) if d.is_ascii_digit() => {
                let (digits, n) = take_digits(rest);
                let idx: usize = digits.parse().unwrap_or(0);
                let entry = idx
                    .checked_sub(1)
                    .and_then(|i| history.get(i))
                    .ok_or_else(|| ExpansionError::NoSuchEvent(format!("!{digits}")))?;
                Ok((entry.to_string(), n))
            }
            Some('?') => {
                let mut j = 1;
                let mut needle = String::new();
                while j < rest.len() && rest[j] != '?' {
                    needle.push(rest[j]);
                    j += 1;
                }
                let consumed = if j < rest.len() { j + 1 } else { j };
                let entry = Self::search_backward(history, |e| e.contains(&needle))
                    .ok_or_else(|| ExpansionError::NoSuchEvent(format!("!?{needle}?")))?;
                Ok((entry.to_string(), consumed))
            }
            Some(c) if !c.is_whitespace() => {
                let mut j = 0;
                let mut needle = String::new();
                while j < rest.len() && !rest[j].is_whitespace() {
                    needle.push(rest[j]);
                    j += 1;
                }
                let entry = Self::search_backward(history, |e| e.starts_with(&needle))
                    .ok_or_else(|| ExpansionError::NoSuchEvent(format!("!{needle}")))?;
                Ok((entry.to_string(), j))
            }
            Some(c) => Err(ExpansionError::UnknownDesignator(*c)),
        }
    }

    fn most_recent(history: &dyn History) -> Option<&str> {
        let len = history.len();
        if len == 0 { None } else { history.get(len - 1) }
    }

    fn search_backward<'a>(
        history: &'a dyn History,
        pred: impl Fn(&str) -> bool,
    ) -> Option<&'a str> {
        for i in (0..history.len()).rev() {
            if let Some(e) = history.get(i) {
                if pred(e) {
                    return Some(e);
                }
            }
        }
        None
    }

    /// `^a^b` at column 0: substitute the first occurrence of `a` with `b`
    /// in the most recent history entry and return the result.
    fn expand_caret_substitution(
        rest: &str,
        history: &dyn History,
    ) -> Result<String, ExpansionError> {
        let mut parts = rest.splitn(3, '^');
        let from = parts.next().unwrap_or_default();
        let to = parts.next().unwrap_or_default();
        let previous = Self::most_recent(history).ok_or(ExpansionError::NoPreviousSubstitution)?;
        if from.is_empty() || !previous.contains(from) {
            return Err(ExpansionError::NoPreviousSubstitution);
        }
        Ok(previous.replacen(from, to, 1))
    }
}

fn take_digits(chars: &[char]) -> (String, usize) {
    let mut s = String::new();
    let mut n = 0;
    for &c in chars {
        if c.is_ascii_digit() {
            s.push(c);
            n += 1;
        } else {
            break;
        }
    }
    (s, n)
}

fn last_word(s: &str) -> Option<&str> {
    s.split_ascii_whitespace().next_back()
}

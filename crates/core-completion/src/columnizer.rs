//! Columnizer (§4.11): formats a candidate list into a grid for `doList`.

use crate::Candidate;
use unicode_width::UnicodeWidthStr;

const GUTTER: usize = 2;
const DESCRIPTION_PAD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub lines: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Columnizer;

impl Columnizer {
    /// Lays out `candidates` for display under the prompt. `terminal_width`
    /// bounds line length; `rows_first` selects row-major vs column-major
    /// grid order (`LIST_ROWS_FIRST`); `group` partitions by `Candidate.group`
    /// first, each group getting a header line.
    pub fn layout(
        candidates: &[Candidate],
        terminal_width: usize,
        rows_first: bool,
        group: bool,
    ) -> ColumnLayout {
        let terminal_width = terminal_width.max(1);
        if group {
            let mut lines = Vec::new();
            for (header, members) in Self::grouped(candidates) {
                if let Some(h) = header {
                    lines.push(format!("{h}:"));
                }
                lines.extend(Self::layout_flat(&members, terminal_width, rows_first).lines);
            }
            return ColumnLayout { lines };
        }
        Self::layout_flat(candidates, terminal_width, rows_first)
    }

    fn grouped(candidates: &[Candidate]) -> Vec<(Option<String>, Vec<Candidate>)> {
        let mut order: Vec<Option<String>> = Vec::new();
        let mut buckets: std::collections::HashMap<Option<String>, Vec<Candidate>> =
            std::collections::HashMap::new();
        for c in candidates {
            if !buckets.contains_key(&c.group) {
                order.push(c.group.clone());
            }
            buckets.entry(c.group.clone()).or_default().push(c.clone());
        }
        order
            .into_iter()
            .map(|g| {
                let members = buckets.remove(&g).unwrap_or_default();
                (g, members)
            })
            .collect()
    }

    fn layout_flat(candidates: &[Candidate], terminal_width: usize, rows_first: bool) -> ColumnLayout {
        if candidates.is_empty() {
            return ColumnLayout { lines: Vec::new() };
        }
        if candidates.iter().any(|c| c.description.is_some()) {
            return Self::layout_with_descriptions(candidates, terminal_width);
        }

        let widest = candidates
            .iter()
            .map(|c| c.display.width())
            .max()
            .unwrap_or(1);
        let col_width = widest + GUTTER;
        let cols = (terminal_width / col_width).max(1);
        let n = candidates.len();
        let rows = n.div_ceil(cols);

        let mut lines = Vec::with_capacity(rows);
        for r in 0..rows {
            let mut line = String::new();
            for c in 0..cols {
                let idx = if rows_first { r * cols + c } else { c * rows + r };
                let Some(cand) = candidates.get(idx) else {
                    break;
                };
                let pad = col_width.saturating_sub(cand.display.width());
                line.push_str(&cand.display);
                if c + 1 < cols {
                    line.push_str(&" ".repeat(pad));
                }
            }
            lines.push(line);
        }
        ColumnLayout { lines }
    }

    fn layout_with_descriptions(candidates: &[Candidate], terminal_width: usize) -> ColumnLayout {
        let widest = candidates
            .iter()
            .map(|c| c.display.width())
            .max()
            .unwrap_or(1);
        let mut lines = Vec::with_capacity(candidates.len());
        for c in candidates {
            let mut line = c.display.clone();
            if let Some(desc) = &c.description {
                let pad = widest.saturating_sub(c.display.width()) + DESCRIPTION_PAD;
                line.push_str(&" ".repeat(pad));
                line.push_str(desc);
            }
            if line.width() > terminal_width {
                line = truncate_to_width(&line, terminal_width);
            }
            lines.push(line);
        }
        ColumnLayout { lines }
    }
}

fn truncate_to_width(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut w = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthStr::width(ch.encode_utf8(&mut [0; 4]) as &str);
        if w + cw > width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out
}

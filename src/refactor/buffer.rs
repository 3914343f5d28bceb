//! Line buffer used to rewrite one source file.
//!
//! Every slot keeps its own line terminator. A slot emptied by a multi-line
//! replacement becomes a tombstone (`""`) instead of being removed, so slot
//! indices computed from the original content stay valid for later
//! insertions. Original lines are never empty because they carry a
//! terminator, which makes `""` unambiguous.

use std::collections::BTreeSet;

use crate::core::errors::{LiteralistError, Result};
use crate::lang::common::Occurrence;

/// Source span with 1-based lines and 0-based UTF-8 byte columns. The end
/// column is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// First line (1-based)
    pub start_line: usize,
    /// Byte column on the first line
    pub start_col: usize,
    /// Last line (1-based)
    pub end_line: usize,
    /// Exclusive byte column on the last line
    pub end_col: usize,
}

impl From<&Occurrence> for Span {
    fn from(occurrence: &Occurrence) -> Self {
        Self {
            start_line: occurrence.lineno,
            start_col: occurrence.col_offset,
            end_line: occurrence.end_lineno,
            end_col: occurrence.end_col_offset,
        }
    }
}

/// Mutable line-oriented view of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    newline: &'static str,
}

impl LineBuffer {
    /// Split `text` into slots. A final line without terminator gets one.
    pub fn from_text(text: &str) -> Self {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        if let Some(last) = lines.last_mut() {
            if !last.ends_with('\n') {
                last.push_str(newline);
            }
        }
        Self { lines, newline }
    }

    /// Concatenated content.
    pub fn render(&self) -> String {
        self.lines.concat()
    }

    /// Number of slots, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of lines the rendered content has.
    pub fn line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_empty()).count()
    }

    /// Line terminator detected in the original text.
    pub fn newline(&self) -> &'static str {
        self.newline
    }

    /// Whether some line equals `text` once surrounding whitespace is ignored.
    pub fn contains_line(&self, text: &str) -> bool {
        let wanted = text.trim();
        self.lines.iter().any(|line| line.trim() == wanted)
    }

    /// Replace the text covered by `span` with `name`. A span crossing lines
    /// collapses onto its first line and tombstones the others.
    pub fn replace_span(&mut self, span: Span, name: &str) -> Result<()> {
        let first = self.slot_index(span.start_line)?;
        let last = self.slot_index(span.end_line)?;
        if last < first || (first == last && span.end_col < span.start_col) {
            return Err(invalid_span(span, "end precedes start"));
        }
        if self.lines[first..=last].iter().any(String::is_empty) {
            return Err(invalid_span(span, "overlaps an earlier replacement"));
        }

        let prefix = checked_prefix(&self.lines[first], span.start_col, span)?;
        let suffix = checked_suffix(&self.lines[last], span.end_col, span)?;
        let joined = format!("{prefix}{name}{suffix}");

        self.lines[first] = joined;
        for line in &mut self.lines[first + 1..=last] {
            line.clear();
        }
        Ok(())
    }

    /// Insert `new_lines` (without terminators) before slot `at`.
    pub fn insert_lines(&mut self, at: usize, new_lines: &[String]) {
        let at = at.min(self.lines.len());
        let rendered = new_lines
            .iter()
            .map(|line| format!("{line}{}", self.newline));
        self.lines.splice(at..at, rendered);
    }

    /// Delete unambiguous single-line top-level assignments to any of
    /// `names`. Returns the number of lines removed.
    ///
    /// A line qualifies when it starts a statement at column 0 outside any
    /// open bracket or string, reads `NAME =` (not `==`), closes every
    /// bracket and string it opens, holds no other statement after a `;`
    /// and does not end in a continuation backslash. Multi-line definitions
    /// are left alone.
    pub fn remove_assignments(&mut self, names: &BTreeSet<String>) -> usize {
        let mut state = LexState::default();
        let mut removed = 0;
        for line in &mut self.lines {
            if line.is_empty() {
                continue;
            }
            let at_statement_start = state.is_clean();
            state.feed(line);
            if at_statement_start
                && state.is_clean()
                && !state.compound
                && assigned_name(line).is_some_and(|name| names.contains(name))
            {
                line.clear();
                removed += 1;
            }
        }
        removed
    }

    fn slot_index(&self, line: usize) -> Result<usize> {
        if line == 0 || line > self.lines.len() {
            return Err(LiteralistError::validation(format!(
                "line {line} is outside a buffer of {} lines",
                self.lines.len()
            )));
        }
        Ok(line - 1)
    }
}

fn content_len(line: &str) -> usize {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line)
        .len()
}

fn checked_prefix(line: &str, col: usize, span: Span) -> Result<&str> {
    if col > content_len(line) || !line.is_char_boundary(col) {
        return Err(invalid_span(span, "start column is not inside the line"));
    }
    Ok(&line[..col])
}

fn checked_suffix(line: &str, col: usize, span: Span) -> Result<&str> {
    if col > content_len(line) || !line.is_char_boundary(col) {
        return Err(invalid_span(span, "end column is not inside the line"));
    }
    Ok(&line[col..])
}

fn invalid_span(span: Span, reason: &str) -> LiteralistError {
    LiteralistError::validation(format!(
        "span {}:{}-{}:{} {reason}",
        span.start_line, span.start_col, span.end_line, span.end_col
    ))
}

/// `NAME` for a line of the form `NAME = ...` starting at column 0.
fn assigned_name(line: &str) -> Option<&str> {
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let name = &line[..end];
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let rest = line[end..].trim_start_matches([' ', '\t']);
    let value = rest.strip_prefix('=')?;
    if value.starts_with('=') {
        return None;
    }
    Some(name)
}

/// Bracket, string and continuation state carried across lines.
#[derive(Debug, Default)]
struct LexState {
    depth: usize,
    string: Option<(char, bool)>,
    continued: bool,
    /// Last fed line had a top-level `;`
    compound: bool,
}

impl LexState {
    fn is_clean(&self) -> bool {
        self.depth == 0 && self.string.is_none() && !self.continued
    }

    fn feed(&mut self, line: &str) {
        let content = &line[..content_len(line)];
        self.continued = false;
        self.compound = false;
        let chars: Vec<char> = content.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match self.string {
                Some((quote, triple)) => {
                    if c == '\\' {
                        if i + 1 == chars.len() {
                            self.continued = !triple;
                        }
                        i += 2;
                        continue;
                    }
                    if c == quote {
                        if !triple {
                            self.string = None;
                        } else if chars[i..].starts_with(&[quote, quote, quote]) {
                            self.string = None;
                            i += 3;
                            continue;
                        }
                    }
                }
                None => match c {
                    '#' => break,
                    ';' if self.depth == 0 => self.compound = true,
                    '(' | '[' | '{' => self.depth += 1,
                    ')' | ']' | '}' => self.depth = self.depth.saturating_sub(1),
                    '\'' | '"' => {
                        let triple = chars[i..].starts_with(&[c, c, c]);
                        self.string = Some((c, triple));
                        i += if triple { 3 } else { 1 };
                        continue;
                    }
                    '\\' if i + 1 == chars.len() => self.continued = true,
                    _ => {}
                },
            }
            i += 1;
        }
        // An unterminated single-quoted string only continues past a backslash.
        if matches!(self.string, Some((_, false))) && !self.continued {
            self.string = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn span(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Span {
        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_line_replacement() {
        let mut buffer = LineBuffer::from_text("x = foo('magic')\n");
        buffer.replace_span(span(1, 8, 1, 15), "MAGIC").unwrap();
        assert_eq!(buffer.render(), "x = foo(MAGIC)\n");
    }

    #[test]
    fn test_multi_line_replacement_collapses_onto_first_line() {
        let mut buffer =
            LineBuffer::from_text("msg = ('first '\n       'middle '\n       'last')\nnext = 1\n");
        buffer.replace_span(span(1, 7, 3, 13), "MESSAGE").unwrap();
        assert_eq!(buffer.render(), "msg = (MESSAGE)\nnext = 1\n");
        assert_eq!(buffer.slot_count(), 4);
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_invalid_spans_are_rejected() {
        let mut buffer = LineBuffer::from_text("s = 'é'\n");
        assert!(buffer.replace_span(span(2, 0, 2, 1), "X").is_err());
        assert!(buffer.replace_span(span(1, 5, 1, 3), "X").is_err());
        assert!(buffer.replace_span(span(1, 5, 1, 6), "X").is_err());
        assert!(buffer.replace_span(span(1, 4, 1, 40), "X").is_err());
        assert_eq!(buffer.render(), "s = 'é'\n");
    }

    #[test]
    fn test_overlapping_tombstone_is_rejected() {
        let mut buffer = LineBuffer::from_text("a = ('x'\n'y')\n");
        buffer.replace_span(span(1, 5, 2, 3), "XY").unwrap();
        assert!(buffer.replace_span(span(2, 0, 2, 1), "Z").is_err());
    }

    #[test]
    fn test_missing_final_newline_is_added() {
        let buffer = LineBuffer::from_text("a = 1");
        assert_eq!(buffer.render(), "a = 1\n");
    }

    #[test]
    fn test_insert_uses_detected_newline() {
        let mut buffer = LineBuffer::from_text("import os\r\nx = 1\r\n");
        buffer.insert_lines(1, &["from constants import A".to_string()]);
        assert_eq!(buffer.render(), "import os\r\nfrom constants import A\r\nx = 1\r\n");
        assert_eq!(buffer.newline(), "\r\n");
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut buffer = LineBuffer::from_text("x = 1\n");
        buffer.insert_lines(10, &["Y = 2".to_string()]);
        assert_eq!(buffer.render(), "x = 1\nY = 2\n");
    }

    #[test]
    fn test_contains_line_ignores_surrounding_whitespace() {
        let buffer = LineBuffer::from_text("from constants import A, B  \n");
        assert!(buffer.contains_line("from constants import A, B"));
        assert!(!buffer.contains_line("from constants import A"));
    }

    #[test]
    fn test_remove_assignments_only_touches_simple_top_level_lines() {
        let source = r#"STR1 = 'str1'
STR1 == other
def f():
    STR1 = 'inner'
LONG = (
    'a',
)
DOC = """
STR1 = 'inside a string'
"""
SPLIT = 1 + \
    2
OTHER = 'kept'
PAIR = 'pair'; setup()
SEP = 'a;b'
"#;
        let mut buffer = LineBuffer::from_text(source);
        let removed =
            buffer.remove_assignments(&names(&["STR1", "LONG", "SPLIT", "PAIR", "SEP"]));
        assert_eq!(removed, 2);
        let rendered = buffer.render();
        assert!(!rendered.starts_with("STR1 = 'str1'"));
        assert!(rendered.contains("STR1 == other"));
        assert!(rendered.contains("    STR1 = 'inner'"));
        assert!(rendered.contains("LONG = (\n"));
        assert!(rendered.contains("STR1 = 'inside a string'"));
        assert!(rendered.contains("SPLIT = 1 + \\\n"));
        assert!(rendered.contains("OTHER = 'kept'"));
        assert!(rendered.contains("PAIR = 'pair'; setup()\n"));
        assert!(!rendered.contains("SEP = 'a;b'"));
    }

    #[test]
    fn test_assigned_name() {
        assert_eq!(assigned_name("NAME = 1\n"), Some("NAME"));
        assert_eq!(assigned_name("NAME=1\n"), Some("NAME"));
        assert_eq!(assigned_name("NAME == 1\n"), None);
        assert_eq!(assigned_name("NAME: int = 1\n"), None);
        assert_eq!(assigned_name(" NAME = 1\n"), None);
        assert_eq!(assigned_name("1NAME = 1\n"), None);
    }

    proptest! {
        #[test]
        fn prop_span_integrity(
            layout in prop::collection::vec((0usize..3, 0usize..3), 1..20),
            tail in 0usize..3,
        ) {
            // Each span occupies its own lines: `gap` untouched lines, then a
            // span covering `extra + 1` lines.
            let mut spans = Vec::new();
            let mut cursor = 1;
            for (gap, extra) in &layout {
                let start = cursor + gap;
                let end = start + extra;
                let (start_col, end_col) = if *extra == 0 { (2, 5) } else { (3, 4) };
                spans.push(span(start, start_col, end, end_col));
                cursor = end + 1;
            }
            let total = cursor - 1 + tail;
            let text: String = (0..total).map(|i| format!("line_{i:04}\n")).collect();

            let mut buffer = LineBuffer::from_text(&text);
            spans.sort();
            for s in spans.iter().rev() {
                buffer.replace_span(*s, "NAME").unwrap();
            }

            let collapsed: usize = layout.iter().map(|(_, extra)| extra).sum();
            prop_assert_eq!(buffer.line_count(), total - collapsed);
            prop_assert_eq!(buffer.slot_count(), total);
            prop_assert_eq!(buffer.render().lines().count(), total - collapsed);
        }
    }
}

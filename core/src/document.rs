//! Document of typed lines.
//!
//! The document is the sheet of paper in the machine: an ordered list of
//! lines that only ever changes at its tail. Characters are appended to or
//! removed from the end of the last line, and lines are appended or removed
//! only at the end of the document. There is no mid-document editing.

use serde::{Deserialize, Serialize};

/// Ordered sequence of typed lines. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Create a fresh document holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a document from existing lines. An empty input yields `[""]`.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            Self::new()
        } else {
            Self { lines }
        }
    }

    /// All lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line, the only one that can be edited.
    pub fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    /// The line currently under the type bars.
    pub fn active_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    /// Length of the active line in characters (not bytes).
    pub fn active_len(&self) -> usize {
        self.active_line().chars().count()
    }

    /// Length of the line at `index` in characters, 0 if out of range.
    pub fn line_len(&self, index: usize) -> usize {
        self.lines
            .get(index)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    /// Append a character to the active line.
    pub fn push_char(&mut self, ch: char) {
        if let Some(line) = self.lines.last_mut() {
            line.push(ch);
        }
    }

    /// Remove the last character of the active line.
    /// Returns the removed character, if any.
    pub fn pop_char(&mut self) -> Option<char> {
        self.lines.last_mut().and_then(String::pop)
    }

    /// Start a new empty line at the end of the document.
    pub fn push_line(&mut self) {
        self.lines.push(String::new());
    }

    /// Remove the active line if it is empty and not the only line.
    /// Returns true if a line was removed.
    pub fn pop_empty_line(&mut self) -> bool {
        if self.lines.len() > 1 && self.active_line().is_empty() {
            self.lines.pop();
            true
        } else {
            false
        }
    }

    /// True when every line is empty.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    /// Copy of the lines, one string per line.
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.clone()
    }

    /// Consume the document and return its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

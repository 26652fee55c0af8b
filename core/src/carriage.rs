//! Cursor and carriage position.
//!
//! On a manual typewriter the paper moves, not the type bars: every typed
//! character shifts the carriage one unit to the left. The carriage offset is
//! therefore a pure function of the cursor column.

use serde::{Deserialize, Serialize};

/// Insertion point inside the document. Always at the tail of the last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Index of the active line
    pub line: usize,
    /// Character index inside the active line
    pub column: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Cursor at the very start of the sheet.
    pub fn origin() -> Self {
        Self::default()
    }

    /// Is the cursor at (0, 0)?
    pub fn is_origin(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

/// Horizontal carriage offset for a cursor column.
///
/// Negative values move the carriage left. `column * char_width` saturates
/// instead of overflowing.
pub fn offset_for(column: usize, char_width: i32) -> i32 {
    let column = i32::try_from(column).unwrap_or(i32::MAX);
    column.saturating_mul(char_width).saturating_neg()
}

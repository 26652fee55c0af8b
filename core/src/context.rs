//! Presentation view of the typewriter.
//!
//! `TypewriterContext` is a plain data container with public fields. After
//! feeding input to a [`Typewriter`](crate::Typewriter), a front-end reads it
//! to draw the sheet, the carriage and the keystroke indicator. No callbacks,
//! no traits: just data.

use crate::carriage::Cursor;
use crate::machine::Mode;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypewriterContext {
    /// Lines on the sheet
    pub lines: Vec<String>,

    /// Insertion point (tail of the last line)
    pub cursor: Cursor,

    /// Horizontal carriage position in character-width units
    pub carriage_offset: i32,

    /// Editing or finished
    pub mode: Mode,

    /// Keystroke shake in progress
    pub is_shaking: bool,

    /// Carriage spring-back in progress
    pub is_returning: bool,

    /// Last struck key while the shake is visible
    pub active_key: Option<char>,

    /// Characters left before the bell on the active line
    pub remaining_on_line: usize,
}

impl TypewriterContext {
    /// Is the sheet frozen?
    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Finished
    }

    /// Should the blinking caret be drawn on line `index`?
    pub fn shows_caret_on(&self, index: usize) -> bool {
        !self.is_finished() && index == self.cursor.line
    }
}

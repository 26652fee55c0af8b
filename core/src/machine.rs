//! Typewriter input state machine.
//!
//! All transitions are expressed as a pure function [`step`] that takes the
//! current state and an [`Event`] and returns the next state, the effects to
//! perform and whether the event was applied. Preconditions never fail: an
//! event that does not apply (line full, already finished, nothing to
//! delete) is refused and leaves the state untouched.
//!
//! Invariants maintained by every transition:
//! - the cursor sits at the tail of the last line,
//! - no line is longer than `Config::max_chars_per_line`,
//! - the carriage offset equals `-(column * char_width)`.

use crate::carriage::{offset_for, Cursor};
use crate::document::Document;
use crate::feedback::{Effect, Feedback, Flag};
use crate::Config;
use serde::{Deserialize, Serialize};

/// Lifecycle mode of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Document accepts input
    Editing,
    /// Document is frozen and may be saved or exported
    Finished,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Editing
    }
}

/// Events the machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Strike a character key
    Type(char),
    /// Delete the last character, or join back to the previous line
    Backspace,
    /// Feed a new line and return the carriage
    CarriageReturn,
    /// Freeze the document
    Finish,
    /// Start over with a blank sheet (only from `Finished`)
    Reset,
    /// A settle timer elapsed
    Settled(Flag),
}

/// Whether an event changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Precondition not met; state and effects untouched
    Refused,
}

/// Complete machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypewriterState {
    document: Document,
    cursor: Cursor,
    carriage_offset: i32,
    mode: Mode,
    is_shaking: bool,
    is_returning: bool,
    active_key: Option<char>,
}

impl TypewriterState {
    /// Blank sheet in editing mode.
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            cursor: Cursor::origin(),
            carriage_offset: 0,
            mode: Mode::Editing,
            is_shaking: false,
            is_returning: false,
            active_key: None,
        }
    }

    /// Editing state positioned at the tail of `document`.
    ///
    /// Control characters are dropped and each line is cut to
    /// `max_chars_per_line`, the same limits typing enforces.
    pub fn with_document(document: Document, config: &Config) -> Self {
        let lines = document.into_lines().into_iter().map(|line| {
            line.chars()
                .filter(|ch| !ch.is_control())
                .take(config.max_chars_per_line)
                .collect::<String>()
        });
        let mut state = Self {
            document: Document::from_lines(lines),
            ..Self::new()
        };
        state.resync_cursor(config);
        state
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn carriage_offset(&self) -> i32 {
        self.carriage_offset
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_finished(&self) -> bool {
        self.mode == Mode::Finished
    }

    pub fn is_shaking(&self) -> bool {
        self.is_shaking
    }

    pub fn is_returning(&self) -> bool {
        self.is_returning
    }

    /// Last struck key (lower-cased) while the shake is visible.
    pub fn active_key(&self) -> Option<char> {
        self.active_key
    }

    /// Check the tail-cursor, line-width and carriage invariants.
    pub fn is_consistent(&self, config: &Config) -> bool {
        let doc = &self.document;
        self.cursor.line == doc.last_index()
            && self.cursor.column == doc.active_len()
            && self.carriage_offset == offset_for(self.cursor.column, config.char_width)
            && doc
                .lines()
                .iter()
                .all(|l| l.chars().count() <= config.max_chars_per_line)
    }

    fn resync_cursor(&mut self, config: &Config) {
        self.cursor = Cursor::new(self.document.last_index(), self.document.active_len());
        self.carriage_offset = offset_for(self.cursor.column, config.char_width);
    }
}

impl Default for TypewriterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TypewriterState,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(state: TypewriterState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            outcome: Outcome::Applied,
        }
    }

    fn refused(state: TypewriterState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            outcome: Outcome::Refused,
        }
    }

    /// Feedback events in emission order, without settle timers.
    pub fn feedback(&self) -> impl Iterator<Item = &Feedback> {
        self.effects.iter().filter_map(Effect::feedback)
    }
}

/// Apply `event` to `state`.
pub fn step(state: TypewriterState, event: Event, config: &Config) -> Transition {
    match event {
        Event::Type(ch) => type_character(state, ch, config),
        Event::Backspace => backspace(state, config),
        Event::CarriageReturn => carriage_return(state, config),
        Event::Finish => finish(state),
        Event::Reset => reset(state),
        Event::Settled(flag) => settle(state, flag),
    }
}

fn type_character(mut state: TypewriterState, ch: char, config: &Config) -> Transition {
    if state.mode != Mode::Editing
        || ch.is_control()
        || state.document.active_len() >= config.max_chars_per_line
    {
        // Carriage is locked
        return Transition::refused(state);
    }

    state.document.push_char(ch);
    state.resync_cursor(config);
    state.is_shaking = true;
    state.active_key = ch.to_lowercase().next();

    let mut effects = vec![
        Effect::Feedback(Feedback::Click),
        Effect::Settle {
            flag: Flag::Shaking,
            after: config.keystroke_shake(),
        },
    ];
    if state.cursor.column == config.max_chars_per_line {
        effects.push(Effect::Feedback(Feedback::Bell));
    }
    Transition::applied(state, effects)
}

fn backspace(mut state: TypewriterState, config: &Config) -> Transition {
    if state.mode != Mode::Editing {
        return Transition::refused(state);
    }

    if state.cursor.column > 0 {
        state.document.pop_char();
        state.resync_cursor(config);
        return Transition::applied(state, vec![Effect::Feedback(Feedback::Click)]);
    }

    if state.cursor.line > 0 && state.document.pop_empty_line() {
        state.resync_cursor(config);
        state.is_returning = true;
        let effects = vec![
            Effect::Feedback(Feedback::Return),
            Effect::Settle {
                flag: Flag::Returning,
                after: config.line_join_settle(),
            },
        ];
        return Transition::applied(state, effects);
    }

    Transition::refused(state)
}

fn carriage_return(mut state: TypewriterState, config: &Config) -> Transition {
    if state.mode != Mode::Editing {
        return Transition::refused(state);
    }

    state.document.push_line();
    state.resync_cursor(config);
    state.is_returning = true;
    let effects = vec![
        Effect::Feedback(Feedback::Return),
        Effect::Settle {
            flag: Flag::Returning,
            after: config.return_settle(),
        },
    ];
    Transition::applied(state, effects)
}

fn finish(mut state: TypewriterState) -> Transition {
    if state.mode != Mode::Editing {
        return Transition::refused(state);
    }
    state.mode = Mode::Finished;
    Transition::applied(
        state,
        vec![
            Effect::Feedback(Feedback::Return),
            Effect::Feedback(Feedback::Slide),
        ],
    )
}

fn reset(state: TypewriterState) -> Transition {
    if state.mode != Mode::Finished {
        return Transition::refused(state);
    }
    Transition::applied(TypewriterState::new(), Vec::new())
}

fn settle(mut state: TypewriterState, flag: Flag) -> Transition {
    match flag {
        Flag::Shaking => {
            state.is_shaking = false;
            state.active_key = None;
        }
        Flag::Returning => state.is_returning = false,
    }
    Transition::applied(state, Vec::new())
}

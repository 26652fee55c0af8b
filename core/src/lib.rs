//! typewriter-core
//!
//! Input state machine and collaborators for an interactive typewriter:
//! a fixed-width sheet that only grows at its tail, a carriage that moves one
//! unit per keystroke, a bell at the end of the line, and a finished/editing
//! mode switch. Finished letters can be saved to a letter store or exported as
//! a PDF; snapshots of the sheet can be taken at any time.
//!
//! Public API:
//! - `step`, `TypewriterState`, `Event`, `Mode` - the pure state machine
//! - `Typewriter` - owning wrapper that queues effects for an executor
//! - `InputEvent`, `Key`, `Modifiers` - raw input and its translation
//! - `Effect`, `Feedback`, `FeedbackSink` - what the executor must perform
//! - `Snapshot`, `SnapshotArchive` - in-memory copies of the sheet
//! - `ThemeBook`, `ThemeTokens`, `InkColor` - visual token table
//! - `LetterStore`, `Letter` - persistence of finished letters
//! - `Exporter`, `LetterSurface` - PDF export
//! - `Config` - mechanics and theme configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub mod carriage;
pub use carriage::Cursor;

pub mod document;
pub use document::Document;

pub mod feedback;
pub use feedback::{Effect, Feedback, FeedbackSink, Flag, Notice, NoticeLevel, SilentSink};

pub mod machine;
pub use machine::{step, Event, Mode, Outcome, Transition, TypewriterState};

pub mod key;
pub use key::{InputEvent, Key, KeyResult, Modifiers};

pub mod context;
pub use context::TypewriterContext;

pub mod engine;
pub use engine::Typewriter;

pub mod snapshot;
pub use snapshot::{Snapshot, SnapshotArchive};

pub mod theme;
pub use theme::{InkColor, Rgb, ThemeBook, ThemeTokens, Typeface};

pub mod letter;
pub use letter::Letter;

pub mod store;
pub use store::{InMemoryLetterStore, LetterStore, RedbLetterStore, StoreError};

pub mod remote;
pub use remote::{RemoteConfig, RemoteLetterStore};

pub mod export;
pub use export::{ExportError, Exporter, LetterSurface, PageLayout};

/// Characters that fit on one line before the carriage locks.
pub const MAX_CHARS_PER_LINE: usize = 48;
/// Horizontal carriage advance per character.
pub const CHAR_WIDTH: i32 = 11;
/// Rightward drag distance that triggers a carriage return.
pub const DRAG_RETURN_THRESHOLD: f32 = 80.0;

/// Errors loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Mechanics of the machine plus extra themes.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Characters per line; the bell rings on the last one
    pub max_chars_per_line: usize,

    /// Carriage advance per character
    pub char_width: i32,

    /// Drag distance (same units as `char_width`) that returns the carriage
    pub drag_return_threshold: f32,

    /// Spring-back time after a carriage return
    pub return_settle_ms: u64,

    /// Spring-back time after backspacing onto the previous line
    pub line_join_settle_ms: u64,

    /// Duration of the keystroke shake
    pub keystroke_shake_ms: u64,

    /// Themes added to (or replacing) the built-in `love` and `vintage`
    pub themes: Vec<ThemeTokens>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chars_per_line: MAX_CHARS_PER_LINE,
            char_width: CHAR_WIDTH,
            drag_return_threshold: DRAG_RETURN_THRESHOLD,
            return_settle_ms: 600,
            line_join_settle_ms: 300,
            keystroke_shake_ms: 60,
            themes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn return_settle(&self) -> Duration {
        Duration::from_millis(self.return_settle_ms)
    }

    pub fn line_join_settle(&self) -> Duration {
        Duration::from_millis(self.line_join_settle_ms)
    }

    pub fn keystroke_shake(&self) -> Duration {
        Duration::from_millis(self.keystroke_shake_ms)
    }

    /// Built-in themes plus the configured ones.
    pub fn theme_book(&self) -> ThemeBook {
        ThemeBook::with_extra(self.themes.iter().cloned())
    }
}

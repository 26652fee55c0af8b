//! Raw input events and their translation into machine events.
//!
//! Front-ends report what the user did (a key with modifiers, the end of a
//! carriage drag). [`InputEvent::translate`] maps that onto an [`Event`] or
//! decides the input is not for the typewriter at all.

use crate::machine::Event;
use crate::Config;
use unicode_normalization::UnicodeNormalization;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    /// Any modifier that turns a key press into a shortcut.
    /// Shift alone still produces text.
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Platform-independent key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Composed text (dead keys, IME commit). Accepted when it composes to a
    /// single character.
    Text(String),
    Enter,
    Backspace,
    /// Anything else (arrows, function keys, Tab, ...)
    Named(String),
}

/// Something the user did to the typewriter.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, modifiers: Modifiers },
    /// Carriage drag released after moving `dx` units to the right
    DragEnd { dx: f32 },
}

impl InputEvent {
    /// Unmodified key press.
    pub fn key(key: Key) -> Self {
        InputEvent::Key {
            key,
            modifiers: Modifiers::none(),
        }
    }

    pub fn char(ch: char) -> Self {
        Self::key(Key::Char(ch))
    }

    /// Map onto a machine event. `None` means not handled.
    pub fn translate(&self, config: &Config) -> Option<Event> {
        match self {
            InputEvent::Key { modifiers, .. } if modifiers.is_shortcut() => None,
            InputEvent::Key { key, .. } => match key {
                Key::Enter => Some(Event::CarriageReturn),
                Key::Backspace => Some(Event::Backspace),
                Key::Char(ch) => Some(Event::Type(*ch)),
                Key::Text(text) => single_char(text).map(Event::Type),
                Key::Named(_) => None,
            },
            InputEvent::DragEnd { dx } if *dx > config.drag_return_threshold => {
                Some(Event::CarriageReturn)
            }
            InputEvent::DragEnd { .. } => None,
        }
    }
}

/// The only character of `text` after NFC composition.
fn single_char(text: &str) -> Option<char> {
    let mut chars = text.nfc();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// Result of offering an input to the typewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The typewriter consumed the input (even if the carriage was locked)
    Handled,
    /// Not a typewriter input; pass it on
    NotHandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys() {
        let cfg = Config::default();
        assert_eq!(InputEvent::char('a').translate(&cfg), Some(Event::Type('a')));
        assert_eq!(
            InputEvent::key(Key::Enter).translate(&cfg),
            Some(Event::CarriageReturn)
        );
        assert_eq!(
            InputEvent::key(Key::Backspace).translate(&cfg),
            Some(Event::Backspace)
        );
        assert_eq!(
            InputEvent::key(Key::Named("ArrowLeft".into())).translate(&cfg),
            None
        );
    }

    #[test]
    fn shortcuts_are_ignored() {
        let cfg = Config::default();
        for modifiers in [
            Modifiers { ctrl: true, ..Modifiers::none() },
            Modifiers { alt: true, ..Modifiers::none() },
            Modifiers { meta: true, ..Modifiers::none() },
        ] {
            for key in [Key::Char('c'), Key::Enter, Key::Backspace] {
                let input = InputEvent::Key { key, modifiers };
                assert_eq!(input.translate(&cfg), None);
            }
        }
    }

    #[test]
    fn shift_still_types() {
        let cfg = Config::default();
        let input = InputEvent::Key {
            key: Key::Char('A'),
            modifiers: Modifiers { shift: true, ..Modifiers::none() },
        };
        assert_eq!(input.translate(&cfg), Some(Event::Type('A')));
    }

    #[test]
    fn composed_text_must_be_one_char() {
        let cfg = Config::default();
        let accent = InputEvent::key(Key::Text("e\u{301}".into()));
        assert_eq!(accent.translate(&cfg), Some(Event::Type('é')));

        let word = InputEvent::key(Key::Text("Tab".into()));
        assert_eq!(word.translate(&cfg), None);

        let empty = InputEvent::key(Key::Text(String::new()));
        assert_eq!(empty.translate(&cfg), None);
    }

    #[test]
    fn drag_returns_past_threshold() {
        let cfg = Config::default();
        assert_eq!(InputEvent::DragEnd { dx: 80.0 }.translate(&cfg), None);
        assert_eq!(
            InputEvent::DragEnd { dx: 80.5 }.translate(&cfg),
            Some(Event::CarriageReturn)
        );
        assert_eq!(InputEvent::DragEnd { dx: -200.0 }.translate(&cfg), None);
    }
}

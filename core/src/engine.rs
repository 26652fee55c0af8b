//! Typewriter engine.
//!
//! `Typewriter` owns a [`TypewriterState`] and the [`Config`] it runs under.
//! It feeds events through the pure [`step`] function and queues the
//! resulting effects until the executor collects them with
//! [`take_effects`](Typewriter::take_effects).

use crate::context::TypewriterContext;
use crate::document::Document;
use crate::feedback::Effect;
use crate::key::{InputEvent, KeyResult};
use crate::machine::{step, Event, Mode, Outcome, TypewriterState};
use crate::snapshot::Snapshot;
use crate::Config;
use tracing::{debug, trace};

/// Input state machine plus its pending effects.
#[derive(Debug, Clone)]
pub struct Typewriter {
    state: TypewriterState,
    config: Config,
    effects: Vec<Effect>,
}

impl Typewriter {
    /// Blank sheet under `config`.
    pub fn new(config: Config) -> Self {
        Self {
            state: TypewriterState::new(),
            config,
            effects: Vec::new(),
        }
    }

    /// Resume editing an existing document, cursor at its tail.
    pub fn with_document(document: Document, config: Config) -> Self {
        Self {
            state: TypewriterState::with_document(document, &config),
            config,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> &TypewriterState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> &Document {
        self.state.document()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// Apply one machine event. Effects are queued, not performed.
    pub fn apply(&mut self, event: Event) -> Outcome {
        let state = std::mem::take(&mut self.state);
        let transition = step(state, event, &self.config);
        self.state = transition.state;

        match transition.outcome {
            Outcome::Applied => debug!(
                ?event,
                line = self.state.cursor().line,
                column = self.state.cursor().column,
                mode = ?self.state.mode(),
                "applied"
            ),
            Outcome::Refused => trace!(?event, "refused"),
        }

        self.effects.extend(transition.effects);
        transition.outcome
    }

    /// Offer a raw input. Inputs that map onto a machine event are handled
    /// even when the machine refuses them (the carriage is simply locked).
    pub fn process_input(&mut self, input: &InputEvent) -> KeyResult {
        match input.translate(&self.config) {
            Some(event) => {
                self.apply(event);
                KeyResult::Handled
            }
            None => KeyResult::NotHandled,
        }
    }

    /// Strike every character of `text` in order. Returns how many landed.
    pub fn type_str(&mut self, text: &str) -> usize {
        text.chars()
            .filter(|ch| self.apply(Event::Type(*ch)) == Outcome::Applied)
            .count()
    }

    pub fn backspace(&mut self) -> Outcome {
        self.apply(Event::Backspace)
    }

    pub fn carriage_return(&mut self) -> Outcome {
        self.apply(Event::CarriageReturn)
    }

    pub fn finish(&mut self) -> Outcome {
        self.apply(Event::Finish)
    }

    /// "Write new": blank sheet after a finished letter.
    pub fn reset(&mut self) -> Outcome {
        self.apply(Event::Reset)
    }

    /// Copy of the sheet as it is now. Works in either mode.
    pub fn take_snapshot(&self) -> Snapshot {
        Snapshot::capture(self.state.document())
    }

    /// The frozen lines, only once the letter is finished.
    pub fn frozen_content(&self) -> Option<Vec<String>> {
        self.state.is_finished().then(|| self.state.document().to_vec())
    }

    /// Drain queued effects in emission order.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Presentation view of the current state.
    pub fn context(&self) -> TypewriterContext {
        let state = &self.state;
        TypewriterContext {
            lines: state.document().to_vec(),
            cursor: state.cursor(),
            carriage_offset: state.carriage_offset(),
            mode: state.mode(),
            is_shaking: state.is_shaking(),
            is_returning: state.is_returning(),
            active_key: state.active_key(),
            remaining_on_line: self
                .config
                .max_chars_per_line
                .saturating_sub(state.document().active_len()),
        }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{Feedback, Flag};
    use crate::key::{Key, Modifiers};

    #[test]
    fn process_input_routes_keys() {
        let mut tw = Typewriter::default();
        assert_eq!(tw.process_input(&InputEvent::char('h')), KeyResult::Handled);
        assert_eq!(
            tw.process_input(&InputEvent::key(Key::Named("Escape".into()))),
            KeyResult::NotHandled
        );
        assert_eq!(tw.document().active_line(), "h");
    }

    #[test]
    fn modified_keys_leave_no_trace() {
        let mut tw = Typewriter::default();
        let copy = InputEvent::Key {
            key: Key::Char('c'),
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::none()
            },
        };
        assert_eq!(tw.process_input(&copy), KeyResult::NotHandled);
        assert!(tw.take_effects().is_empty());
        assert_eq!(tw.document(), &Document::new());
    }

    #[test]
    fn locked_carriage_is_still_handled() {
        let mut tw = Typewriter::default();
        tw.type_str(&"m".repeat(48));
        tw.take_effects();

        assert_eq!(tw.process_input(&InputEvent::char('n')), KeyResult::Handled);
        assert!(tw.take_effects().is_empty());
        assert_eq!(tw.document().active_len(), 48);
    }

    #[test]
    fn effects_queue_in_order() {
        let mut tw = Typewriter::default();
        tw.type_str("a");
        tw.carriage_return();
        let feedback: Vec<_> = tw
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Feedback(f) => Some(f),
                Effect::Settle { .. } => None,
            })
            .collect();
        assert_eq!(feedback, vec![Feedback::Click, Feedback::Return]);
        assert!(tw.take_effects().is_empty());
    }

    #[test]
    fn frozen_content_only_when_finished() {
        let mut tw = Typewriter::default();
        tw.type_str("bye");
        assert!(tw.frozen_content().is_none());
        tw.finish();
        assert_eq!(tw.frozen_content(), Some(vec!["bye".to_string()]));
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut tw = Typewriter::default();
        tw.type_str("keep");
        let before = tw.state().clone();
        let snap = tw.take_snapshot();
        assert_eq!(snap.lines, vec!["keep"]);
        assert_eq!(tw.state(), &before);

        tw.finish();
        assert_eq!(tw.take_snapshot().lines, vec!["keep"]);
    }

    #[test]
    fn context_reports_presentation_state() {
        let mut tw = Typewriter::default();
        tw.type_str("Hi");
        let ctx = tw.context();
        assert_eq!(ctx.lines, vec!["Hi"]);
        assert_eq!(ctx.carriage_offset, -22);
        assert_eq!(ctx.remaining_on_line, 46);
        assert_eq!(ctx.active_key, Some('i'));
        assert!(ctx.shows_caret_on(0));

        tw.apply(Event::Settled(Flag::Shaking));
        tw.finish();
        let ctx = tw.context();
        assert!(ctx.is_finished());
        assert!(!ctx.is_shaking);
        assert!(!ctx.shows_caret_on(0));
    }
}

//! Feedback events and effects.
//!
//! The state machine never plays sounds or starts timers itself. Every
//! transition returns a list of [`Effect`]s that an executor performs:
//! feedback to render (click, bell, return, slide) and transient presentation
//! flags to clear after a settle delay.

use std::time::Duration;

/// Transient presentation flags cleared by settle timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Keystroke shake of the paper and carriage
    Shaking,
    /// Carriage spring-back after a return
    Returning,
}

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Toast-style notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Discrete named feedback events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Type bar strike
    Click,
    /// End-of-line bell
    Bell,
    /// Carriage return sweep
    Return,
    /// Paper sliding out of the machine
    Slide,
    /// Toast notification
    Notice(Notice),
}

/// Instruction returned by a transition for the executor to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Render a feedback event
    Feedback(Feedback),
    /// Clear `flag` once `after` has elapsed
    Settle { flag: Flag, after: Duration },
}

impl Effect {
    /// The feedback carried by this effect, if any.
    pub fn feedback(&self) -> Option<&Feedback> {
        match self {
            Effect::Feedback(fb) => Some(fb),
            Effect::Settle { .. } => None,
        }
    }
}

/// Receiver of feedback events (audio, visual, toasts).
///
/// Sinks are fire-and-forget: nothing in the state machine waits for them
/// or looks at what they did.
pub trait FeedbackSink {
    fn emit(&mut self, feedback: &Feedback);
}

/// Recording sink, handy for tests and headless runs.
impl FeedbackSink for Vec<Feedback> {
    fn emit(&mut self, feedback: &Feedback) {
        self.push(feedback.clone());
    }
}

impl<S: FeedbackSink + ?Sized> FeedbackSink for &mut S {
    fn emit(&mut self, feedback: &Feedback) {
        (**self).emit(feedback);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl FeedbackSink for SilentSink {
    fn emit(&mut self, _feedback: &Feedback) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<Feedback> = Vec::new();
        sink.emit(&Feedback::Return);
        sink.emit(&Feedback::Slide);
        assert_eq!(sink, vec![Feedback::Return, Feedback::Slide]);
    }

    #[test]
    fn settle_effect_has_no_feedback() {
        let effect = Effect::Settle {
            flag: Flag::Returning,
            after: Duration::from_millis(600),
        };
        assert!(effect.feedback().is_none());
        assert_eq!(
            Effect::Feedback(Feedback::Bell).feedback(),
            Some(&Feedback::Bell)
        );
    }

    #[test]
    fn notice_levels() {
        assert!(Notice::error("boom").is_error());
        assert!(!Notice::info("Ding!").is_error());
        assert_eq!(Notice::success("saved").level, NoticeLevel::Success);
    }
}

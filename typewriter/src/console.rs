//! Terminal rendering of the sheet and of feedback.

use std::io::Write;
use typewriter_core::{Feedback, FeedbackSink, InkColor, NoticeLevel, ThemeTokens, TypewriterContext};

/// Prints feedback to a writer (stdout in the binary).
///
/// Keystroke clicks are silent unless `clicks` is set; everything else is
/// printed on its own line.
pub struct ConsoleSink<W: Write> {
    out: W,
    clicks: bool,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, clicks: false }
    }

    pub fn with_clicks(mut self, clicks: bool) -> Self {
        self.clicks = clicks;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FeedbackSink for ConsoleSink<W> {
    fn emit(&mut self, feedback: &Feedback) {
        let line = match feedback {
            Feedback::Click if self.clicks => "  *clack*".to_string(),
            Feedback::Click => return,
            Feedback::Bell => "  *ding*".to_string(),
            Feedback::Return => "  *zzzip*".to_string(),
            Feedback::Slide => "  (the sheet slides out)".to_string(),
            Feedback::Notice(notice) => {
                let tag = match notice.level {
                    NoticeLevel::Info => "info",
                    NoticeLevel::Success => "ok",
                    NoticeLevel::Error => "error",
                };
                format!("  [{tag}] {}", notice.message)
            }
        };
        // A closed stdout is not worth failing a keystroke over
        let _ = writeln!(self.out, "{line}");
    }
}

/// Draw the sheet as plain text.
///
/// A rule marks the right margin at `width` characters; the caret `_` sits
/// on the active line while editing.
pub fn render_sheet(
    ctx: &TypewriterContext,
    theme: &ThemeTokens,
    ink: InkColor,
    width: usize,
) -> String {
    let rule = format!("+{}+", "-".repeat(width + 1));
    let mut out = String::new();
    out.push_str(&format!(
        "{rule}  theme: {} / ink: {} ({})\n",
        theme.name,
        ink,
        theme.ink.color(ink)
    ));
    for (index, line) in ctx.lines.iter().enumerate() {
        let caret = if ctx.shows_caret_on(index) { "_" } else { "" };
        let text = format!("{line}{caret}");
        let pad = (width + 1).saturating_sub(text.chars().count());
        out.push_str(&format!("|{text}{}|\n", " ".repeat(pad)));
    }
    out.push_str(&rule);
    if ctx.is_finished() {
        out.push_str(&format!("\n {}", theme.sign_off));
    } else {
        out.push_str(&format!(
            "\n line {}, column {} ({} left)",
            ctx.cursor.line + 1,
            ctx.cursor.column,
            ctx.remaining_on_line
        ));
    }
    out
}

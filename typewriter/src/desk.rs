//! The desk: executor for the typewriter's effects.
//!
//! The core machine only returns effects. The desk performs them: feedback
//! goes to a [`FeedbackSink`], settle timers become deadlines that
//! [`Desk::tick`] turns into `Settled` events, and saving or exporting a
//! finished letter runs on a worker thread whose result comes back as a
//! notice on the next tick.
//!
//! Timers are not cancelled. Every keystroke schedules its own shake timer,
//! and the first one to expire clears the flag.

use chrono::{NaiveDate, Utc};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};
use typewriter_core::theme::DEFAULT_THEME;
use typewriter_core::{
    Config, Effect, Event, ExportError, Exporter, Feedback, FeedbackSink, Flag, InkColor,
    InputEvent, KeyResult, Letter, LetterStore, LetterSurface, Notice, Outcome, Snapshot,
    SnapshotArchive, ThemeBook, ThemeTokens, Typewriter, TypewriterContext,
};

/// A pending settle timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Deadline {
    at: Instant,
    flag: Flag,
}

/// One typing session: the machine, its collaborators and the sink that
/// renders feedback.
pub struct Desk<S: FeedbackSink> {
    typewriter: Typewriter,
    archive: SnapshotArchive,
    store: Arc<LetterStore>,
    exporter: Arc<Exporter>,
    themes: ThemeBook,
    theme: String,
    ink: InkColor,
    deadlines: Vec<Deadline>,
    notices_tx: Sender<Notice>,
    notices_rx: Receiver<Notice>,
    workers: Vec<JoinHandle<()>>,
    sink: S,
}

impl<S: FeedbackSink> Desk<S> {
    pub fn new(config: Config, store: LetterStore, exporter: Exporter, sink: S) -> Self {
        let themes = config.theme_book();
        let (notices_tx, notices_rx) = mpsc::channel();
        Self {
            typewriter: Typewriter::new(config),
            archive: SnapshotArchive::new(),
            store: Arc::new(store),
            exporter: Arc::new(exporter),
            themes,
            theme: DEFAULT_THEME.to_string(),
            ink: InkColor::default(),
            deadlines: Vec::new(),
            notices_tx,
            notices_rx,
            workers: Vec::new(),
            sink,
        }
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn context(&self) -> TypewriterContext {
        self.typewriter.context()
    }

    pub fn archive(&self) -> &SnapshotArchive {
        &self.archive
    }

    pub fn store(&self) -> &LetterStore {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn theme(&self) -> &ThemeTokens {
        self.themes.resolve(&self.theme)
    }

    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.names()
    }

    pub fn ink(&self) -> InkColor {
        self.ink
    }

    /// Switch theme. Unknown names are reported and leave the theme as is.
    pub fn set_theme(&mut self, name: &str) -> bool {
        if !self.themes.contains(name) {
            self.sink
                .emit(&Feedback::Notice(Notice::error(format!("Unknown theme '{name}'"))));
            return false;
        }
        self.theme = name.to_string();
        true
    }

    pub fn set_ink(&mut self, ink: InkColor) {
        self.ink = ink;
    }

    /// Offer a raw input to the machine and perform what it asks for.
    pub fn handle_input(&mut self, input: &InputEvent, now: Instant) -> KeyResult {
        let result = self.typewriter.process_input(input);
        self.perform_effects(now);
        result
    }

    /// Apply a machine event directly.
    pub fn apply(&mut self, event: Event, now: Instant) -> Outcome {
        let outcome = self.typewriter.apply(event);
        self.perform_effects(now);
        outcome
    }

    /// Type every character of `text`, returning how many landed.
    pub fn type_str(&mut self, text: &str, now: Instant) -> usize {
        let landed = self.typewriter.type_str(text);
        self.perform_effects(now);
        landed
    }

    pub fn finish(&mut self, now: Instant) -> Outcome {
        self.apply(Event::Finish, now)
    }

    /// Blank sheet after a finished letter. Pending timers are dropped.
    pub fn write_new(&mut self, now: Instant) -> Outcome {
        let outcome = self.apply(Event::Reset, now);
        if outcome == Outcome::Applied {
            self.deadlines.clear();
        }
        outcome
    }

    /// Fire expired settle timers and deliver finished background results.
    /// Returns the number of timers fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        let (mut due, pending): (Vec<Deadline>, Vec<Deadline>) =
            std::mem::take(&mut self.deadlines)
                .into_iter()
                .partition(|d| d.at <= now);
        self.deadlines = pending;

        due.sort_by_key(|d| d.at);
        for deadline in &due {
            self.typewriter.apply(Event::Settled(deadline.flag));
        }
        self.perform_effects(now);
        self.drain_notices();
        due.len()
    }

    /// Earliest pending settle deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().map(|d| d.at).min()
    }

    /// Copy the sheet into the archive. Works in either mode.
    pub fn take_snapshot(&mut self) -> Snapshot {
        let snapshot = self.typewriter.take_snapshot();
        debug!(id = %snapshot.id, lines = snapshot.lines.len(), "snapshot taken");
        self.archive.push(snapshot.clone());
        self.sink
            .emit(&Feedback::Notice(Notice::success("Snapshot saved")));
        snapshot
    }

    /// Save the finished letter on a worker thread.
    ///
    /// Returns `false` (with an error notice) while the letter is still being
    /// edited. The outcome notice arrives on a later [`tick`](Self::tick).
    pub fn save_letter(&mut self) -> bool {
        let Some(content) = self.typewriter.frozen_content() else {
            self.sink.emit(&Feedback::Notice(Notice::error(
                "Finish the letter before saving",
            )));
            return false;
        };

        self.sink
            .emit(&Feedback::Notice(Notice::info("Saving letter...")));
        let store = Arc::clone(&self.store);
        let theme = self.theme.clone();
        let tx = self.notices_tx.clone();
        info!(backend = store.backend_name(), lines = content.len(), "saving letter");

        self.spawn(move || {
            let notice = match store.save_letter(&content, &theme) {
                Ok(letter) => {
                    info!(id = %letter.id, "letter saved");
                    Notice::success("Letter saved safely!")
                }
                Err(e) => {
                    warn!(error = %e, "saving letter failed");
                    Notice::error("Could not save letter.")
                }
            };
            let _ = tx.send(notice);
        });
        true
    }

    /// Export the finished letter as a PDF on a worker thread, dated today (UTC).
    pub fn export(&mut self) -> bool {
        self.export_dated(Utc::now().date_naive())
    }

    /// Export with `date` used for both the heading and the file name.
    pub fn export_dated(&mut self, date: NaiveDate) -> bool {
        let surface = LetterSurface::capture(&self.typewriter, self.theme(), self.ink, date);
        let Some(surface) = surface else {
            let e = ExportError::SurfaceNotFound;
            warn!(error = %e, "export refused");
            self.sink
                .emit(&Feedback::Notice(Notice::error(capitalize(&e.to_string()))));
            return false;
        };

        self.sink
            .emit(&Feedback::Notice(Notice::info("Generating PDF...")));
        let exporter = Arc::clone(&self.exporter);
        let tx = self.notices_tx.clone();

        self.spawn(move || {
            let notice = match exporter.export_dated(Some(&surface), surface.date) {
                Ok(path) => {
                    info!(path = %path.display(), "letter exported");
                    Notice::success("PDF exported successfully!")
                }
                Err(e) => {
                    warn!(error = %e, "export failed");
                    Notice::error(format!("Failed to export PDF: {e}"))
                }
            };
            let _ = tx.send(notice);
        });
        true
    }

    /// Stored letters, newest first. Empty if the store cannot be read.
    pub fn letters(&self) -> Vec<Letter> {
        self.store.get_letters()
    }

    /// Wait for background saves and exports, then deliver their notices.
    pub fn join_pending(&mut self) {
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("background worker panicked");
            }
        }
        self.drain_notices();
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.workers.retain(|w| !w.is_finished());
        self.workers.push(thread::spawn(job));
    }

    fn perform_effects(&mut self, now: Instant) {
        for effect in self.typewriter.take_effects() {
            match effect {
                Effect::Feedback(feedback) => {
                    self.sink.emit(&feedback);
                    if feedback == Feedback::Bell {
                        self.sink.emit(&Feedback::Notice(Notice::info("Ding!")));
                    }
                }
                Effect::Settle { flag, after } => self.deadlines.push(Deadline {
                    at: now + after,
                    flag,
                }),
            }
        }
    }

    fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices_rx.try_recv() {
            self.sink.emit(&Feedback::Notice(notice));
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use typewriter_core::{Key, Mode, NoticeLevel, RemoteConfig};

    fn desk() -> Desk<Vec<Feedback>> {
        let dir = std::env::temp_dir();
        Desk::new(
            Config::default(),
            LetterStore::new_in_memory(),
            Exporter::new(dir),
            Vec::new(),
        )
    }

    fn notices(sink: &[Feedback]) -> Vec<(NoticeLevel, String)> {
        sink.iter()
            .filter_map(|f| match f {
                Feedback::Notice(n) => Some((n.level, n.message.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn keystroke_shake_settles_on_tick() {
        let mut desk = desk();
        let t0 = Instant::now();
        desk.handle_input(&InputEvent::char('Q'), t0);
        assert!(desk.context().is_shaking);
        assert_eq!(desk.context().active_key, Some('q'));
        assert_eq!(desk.next_deadline(), Some(t0 + Duration::from_millis(60)));

        assert_eq!(desk.tick(t0 + Duration::from_millis(10)), 0);
        assert!(desk.context().is_shaking);

        assert_eq!(desk.tick(t0 + Duration::from_millis(60)), 1);
        assert!(!desk.context().is_shaking);
        assert_eq!(desk.context().active_key, None);
        assert_eq!(desk.next_deadline(), None);
    }

    #[test]
    fn first_timer_clears_the_flag() {
        let mut desk = desk();
        let t0 = Instant::now();
        desk.handle_input(&InputEvent::char('a'), t0);
        desk.handle_input(&InputEvent::char('b'), t0 + Duration::from_millis(40));

        desk.tick(t0 + Duration::from_millis(61));
        assert!(!desk.context().is_shaking);
        assert!(desk.next_deadline().is_some());
    }

    #[test]
    fn return_settles_after_its_own_delay() {
        let mut desk = desk();
        let t0 = Instant::now();
        desk.handle_input(&InputEvent::key(Key::Enter), t0);
        assert!(desk.context().is_returning);
        desk.tick(t0 + Duration::from_millis(599));
        assert!(desk.context().is_returning);
        desk.tick(t0 + Duration::from_millis(600));
        assert!(!desk.context().is_returning);
    }

    #[test]
    fn bell_comes_with_a_ding() {
        let mut desk = desk();
        desk.type_str(&"w".repeat(48), Instant::now());
        let sink = desk.sink();
        assert_eq!(sink.iter().filter(|f| **f == Feedback::Bell).count(), 1);
        assert_eq!(notices(sink), vec![(NoticeLevel::Info, "Ding!".to_string())]);
    }

    #[test]
    fn save_requires_finished_letter() {
        let mut desk = desk();
        desk.type_str("draft", Instant::now());
        assert!(!desk.save_letter());
        desk.join_pending();
        assert!(desk.letters().is_empty());
        assert!(notices(desk.sink()).iter().any(|(l, _)| *l == NoticeLevel::Error));
    }

    #[test]
    fn failed_save_reports_and_keeps_the_letter() {
        let mut remote = RemoteConfig::new("http://127.0.0.1:9", "anon");
        remote.timeout_ms = 200;
        let mut desk = Desk::new(
            Config::default(),
            LetterStore::new_remote(remote).unwrap(),
            Exporter::new(std::env::temp_dir()),
            Vec::new(),
        );
        let now = Instant::now();
        desk.type_str("Dear", now);
        desk.apply(Event::CarriageReturn, now);
        desk.type_str("you", now);
        desk.finish(now);
        let before = desk.typewriter().frozen_content();

        assert!(desk.save_letter());
        desk.join_pending();

        assert!(notices(desk.sink())
            .contains(&(NoticeLevel::Error, "Could not save letter.".to_string())));
        assert!(!notices(desk.sink()).iter().any(|(l, _)| *l == NoticeLevel::Success));
        assert_eq!(desk.typewriter().mode(), Mode::Finished);
        assert_eq!(desk.typewriter().frozen_content(), before);
        assert_eq!(before, Some(vec!["Dear".to_string(), "you".to_string()]));
    }

    #[test]
    fn save_runs_in_background() {
        let mut desk = desk();
        let now = Instant::now();
        desk.type_str("HELLO", now);
        desk.apply(Event::CarriageReturn, now);
        desk.type_str("WORLD", now);
        desk.finish(now);
        assert!(desk.set_theme("vintage"));

        assert!(desk.save_letter());
        desk.join_pending();

        let letters = desk.letters();
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].content, vec!["HELLO", "WORLD"]);
        assert_eq!(letters[0].theme, "vintage");
        assert!(notices(desk.sink())
            .contains(&(NoticeLevel::Success, "Letter saved safely!".to_string())));
        // Saving does not leave the finished mode
        assert_eq!(desk.typewriter().mode(), Mode::Finished);
    }

    #[test]
    fn export_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = Desk::new(
            Config::default(),
            LetterStore::new_in_memory(),
            Exporter::new(dir.path()),
            Vec::new(),
        );
        let now = Instant::now();
        assert!(!desk.export());
        assert!(notices(desk.sink())
            .contains(&(NoticeLevel::Error, "Could not find letter content".to_string())));

        desk.type_str("Yours", now);
        desk.finish(now);
        desk.set_ink(InkColor::Blue);
        assert!(desk.export());
        desk.join_pending();

        let file = dir.path().join(Exporter::file_name(Utc::now().date_naive()));
        let bytes = std::fs::read(file).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(notices(desk.sink())
            .contains(&(NoticeLevel::Success, "PDF exported successfully!".to_string())));
    }

    #[test]
    fn export_file_name_matches_heading_date() {
        let dir = tempfile::tempdir().unwrap();
        let mut desk = Desk::new(
            Config::default(),
            LetterStore::new_in_memory(),
            Exporter::new(dir.path()),
            Vec::new(),
        );
        desk.type_str("Happy new year", Instant::now());
        desk.finish(Instant::now());

        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(desk.export_dated(date));
        desk.join_pending();

        let bytes = std::fs::read(dir.path().join("letter-2025-12-31.pdf")).unwrap();
        let needle = b"(December 31, 2025) Tj";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn snapshots_accumulate_newest_first() {
        let mut desk = desk();
        let now = Instant::now();
        desk.type_str("one", now);
        desk.take_snapshot();
        desk.type_str(" two", now);
        let id = desk.take_snapshot().id.clone();

        assert_eq!(desk.archive().len(), 2);
        assert_eq!(desk.archive().latest().map(|s| s.id.as_str()), Some(id.as_str()));
        assert_eq!(
            desk.archive().latest().map(|s| s.lines.clone()),
            Some(vec!["one two".to_string()])
        );
    }

    #[test]
    fn write_new_clears_sheet_and_timers() {
        let mut desk = desk();
        let now = Instant::now();
        desk.type_str("bye", now);
        assert_eq!(desk.write_new(now), Outcome::Refused);
        desk.finish(now);
        assert_eq!(desk.write_new(now), Outcome::Applied);
        assert_eq!(desk.context().lines, vec![String::new()]);
        assert_eq!(desk.next_deadline(), None);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let mut desk = desk();
        assert!(!desk.set_theme("neon"));
        assert_eq!(desk.theme().name, "love");
    }
}

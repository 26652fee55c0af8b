//! In-memory snapshots of the sheet.
//!
//! A snapshot is a point-in-time copy of the document lines. Snapshots live
//! only for the current session and are never written to the letter store.

use crate::document::Document;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Point-in-time copy of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: String,
    pub taken_at: DateTime<Utc>,
    pub lines: Vec<String>,
}

impl Snapshot {
    /// Copy `document` as of now.
    pub fn capture(document: &Document) -> Self {
        Self::capture_at(document, Utc::now())
    }

    /// Copy `document` with an explicit timestamp.
    pub fn capture_at(document: &Document, taken_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            taken_at,
            lines: document.to_vec(),
        }
    }

    /// The last `max_lines` lines joined with newlines.
    pub fn preview(&self, max_lines: usize) -> String {
        let start = self.lines.len().saturating_sub(max_lines);
        self.lines[start..].join("\n")
    }
}

/// Snapshots of the session, most recent first.
#[derive(Debug, Clone, Default)]
pub struct SnapshotArchive {
    entries: Vec<Snapshot>,
}

impl SnapshotArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a snapshot at the front of the archive.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.insert(0, snapshot);
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> Option<&Snapshot> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn capture_copies_lines() {
        let doc = Document::from_lines(["Dear you,", "hello"]);
        let snap = Snapshot::capture(&doc);
        assert_eq!(snap.lines, vec!["Dear you,", "hello"]);
        assert!(!snap.id.is_empty());
    }

    #[test]
    fn archive_is_most_recent_first() {
        let mut archive = SnapshotArchive::new();
        let t0 = Utc.with_ymd_and_hms(2026, 2, 14, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 2, 14, 9, 5, 0).unwrap();

        archive.push(Snapshot::capture_at(&Document::from_lines(["first"]), t0));
        archive.push(Snapshot::capture_at(&Document::from_lines(["second"]), t1));

        let order: Vec<_> = archive.iter().map(|s| s.lines[0].as_str()).collect();
        assert_eq!(order, vec!["second", "first"]);
        assert_eq!(archive.latest().map(|s| s.taken_at), Some(t1));
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn lookup_by_id() {
        let mut archive = SnapshotArchive::new();
        let snap = Snapshot::capture(&Document::new());
        let id = snap.id.clone();
        archive.push(snap);
        assert!(archive.get(&id).is_some());
        assert!(archive.get("missing").is_none());
    }

    #[test]
    fn preview_keeps_tail_lines() {
        let lines: Vec<String> = (1..=20).map(|i| format!("line {}", i)).collect();
        let snap = Snapshot::capture(&Document::from_lines(lines));
        let preview = snap.preview(15);
        assert!(preview.starts_with("line 6\n"));
        assert!(preview.ends_with("line 20"));
        assert_eq!(snap.preview(100).lines().count(), 20);
    }
}

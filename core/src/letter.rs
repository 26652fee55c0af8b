//! Persisted letters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished letter as stored. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub id: String,
    /// One string per line, in order
    pub content: Vec<String>,
    pub theme: String,
    pub created_at: DateTime<Utc>,
}

impl Letter {
    /// Content as a single newline-joined string.
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    /// First non-empty line, used as a title in listings.
    pub fn headline(&self) -> &str {
        self.content
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

/// Newest first. The sort is stable: letters sharing a timestamp keep
/// their incoming order.
pub fn sort_newest_first(letters: &mut [Letter]) {
    letters.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

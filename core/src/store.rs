//! Letter store backends.
//!
//! Three backends sit behind the [`LetterStore`] switch:
//! - `InMemory`: thread-safe vector, used by tests and throwaway sessions.
//! - `Redb`: persistent local file; rows are bincode-encoded letters keyed by
//!   an increasing sequence number.
//! - `Remote`: hosted `letters` table reached over HTTP (see [`crate::remote`]).
//!
//! Only two operations exist: save a finished letter and list letters newest
//! first. Letters are never updated or deleted.

use crate::letter::{sort_newest_first, Letter};
use crate::remote::{RemoteConfig, RemoteLetterStore};
use chrono::Utc;
use redb::ReadableTable;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Failures of the letter store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("letter database error: {0}")]
    Database(#[from] redb::Error),

    #[error("letter encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("letter service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("letter service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("letter service returned no row for the insert")]
    NoRow,

    #[error("letter store lock poisoned")]
    Poisoned,
}

/// Build a letter with a fresh id and the current time.
fn stamp(content: &[String], theme: &str) -> Letter {
    Letter {
        id: Uuid::new_v4().to_string(),
        content: content.to_vec(),
        theme: theme.to_string(),
        created_at: Utc::now(),
    }
}

/// Thread-safe in-memory letter store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLetterStore {
    inner: Arc<RwLock<Vec<Letter>>>,
}

impl InMemoryLetterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_letter(&self, content: &[String], theme: &str) -> Result<Letter, StoreError> {
        let letter = stamp(content, theme);
        let mut rows = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        rows.push(letter.clone());
        Ok(letter)
    }

    pub fn get_letters(&self) -> Result<Vec<Letter>, StoreError> {
        let rows = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut letters: Vec<Letter> = rows.iter().rev().cloned().collect();
        sort_newest_first(&mut letters);
        Ok(letters)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Redb-backed letter store.
///
/// Each save runs in its own write transaction, so concurrent saves from
/// several threads serialize inside redb.
pub struct RedbLetterStore {
    db: redb::Database,
    path: PathBuf,
}

impl RedbLetterStore {
    /// Sequence number -> bincode-encoded `Letter`.
    const TABLE_DEF: redb::TableDefinition<'static, u64, &'static [u8]> =
        redb::TableDefinition::new("letters");

    /// Create or open the database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, redb::Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let db = redb::Database::create(path)?;

        // Make sure the table exists so read transactions can open it.
        let write_txn = db.begin_write()?;
        write_txn.open_table(Self::TABLE_DEF)?;
        write_txn.commit()?;

        debug!(path = %path.display(), "opened letter database");
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_letter(&self, content: &[String], theme: &str) -> Result<Letter, StoreError> {
        let letter = stamp(content, theme);
        let bytes = bincode::serialize(&letter)?;
        let seq = self.insert_row(&bytes)?;
        debug!(seq, id = %letter.id, "stored letter");
        Ok(letter)
    }

    pub fn get_letters(&self) -> Result<Vec<Letter>, StoreError> {
        let mut letters = self
            .rows_newest_first()?
            .iter()
            .map(|bytes| bincode::deserialize::<Letter>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        sort_newest_first(&mut letters);
        Ok(letters)
    }

    fn insert_row(&self, bytes: &[u8]) -> Result<u64, redb::Error> {
        let write_txn = self.db.begin_write()?;
        let seq = {
            let mut table = write_txn.open_table(Self::TABLE_DEF)?;
            let next = match table.last()? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            table.insert(next, bytes)?;
            next
        };
        write_txn.commit()?;
        Ok(seq)
    }

    fn rows_newest_first(&self) -> Result<Vec<Vec<u8>>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::TABLE_DEF)?;
        let mut out = Vec::new();
        for item in table.iter()?.rev() {
            let (_, value) = item?;
            out.push(value.value().to_vec());
        }
        Ok(out)
    }
}

impl fmt::Debug for RedbLetterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbLetterStore")
            .field("path", &self.path)
            .finish()
    }
}

/// Backend switch used by higher-level code.
#[derive(Debug)]
pub enum LetterStore {
    InMemory(InMemoryLetterStore),
    Redb(RedbLetterStore),
    Remote(RemoteLetterStore),
}

impl LetterStore {
    pub fn new_in_memory() -> Self {
        LetterStore::InMemory(InMemoryLetterStore::new())
    }

    /// Open (or create) a redb letter file at `path`.
    pub fn new_redb<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(LetterStore::Redb(RedbLetterStore::new(path)?))
    }

    /// Talk to a hosted letter table.
    pub fn new_remote(config: RemoteConfig) -> Result<Self, StoreError> {
        Ok(LetterStore::Remote(RemoteLetterStore::new(config)?))
    }

    /// Short backend label for logs and status lines.
    pub fn backend_name(&self) -> &'static str {
        match self {
            LetterStore::InMemory(_) => "memory",
            LetterStore::Redb(_) => "redb",
            LetterStore::Remote(_) => "remote",
        }
    }

    /// Persist a finished letter. The store assigns `id` and `created_at`.
    pub fn save_letter(&self, content: &[String], theme: &str) -> Result<Letter, StoreError> {
        match self {
            LetterStore::InMemory(m) => m.save_letter(content, theme),
            LetterStore::Redb(r) => r.save_letter(content, theme),
            LetterStore::Remote(r) => r.save_letter(content, theme),
        }
    }

    /// All letters, newest first, or the failure.
    pub fn try_get_letters(&self) -> Result<Vec<Letter>, StoreError> {
        match self {
            LetterStore::InMemory(m) => m.get_letters(),
            LetterStore::Redb(r) => r.get_letters(),
            LetterStore::Remote(r) => r.get_letters(),
        }
    }

    /// All letters, newest first. Failures are logged and yield an empty list.
    pub fn get_letters(&self) -> Vec<Letter> {
        match self.try_get_letters() {
            Ok(letters) => letters,
            Err(e) => {
                warn!(backend = self.backend_name(), error = %e, "fetching letters failed");
                Vec::new()
            }
        }
    }
}

//! Desk configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All machine options from `typewriter_core::Config` (flattened via serde)
//! - The theme and ink a session starts with
//! - Where letters are stored (`[storage]`)
//! - Where exported PDFs go
//!
//! # Example
//!
//! ```toml
//! max_chars_per_line = 48
//! theme = "vintage"
//! ink = "blue"
//! export_dir = "letters"
//!
//! [storage]
//! backend = "redb"
//! path = "letters.redb"
//! ```

use anyhow::{bail, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use typewriter_core::theme::DEFAULT_THEME;
use typewriter_core::{Config, InkColor, LetterStore, RemoteConfig};

/// Overrides the remote store URL.
pub const STORE_URL_ENV: &str = "TYPEWRITER_STORE_URL";
/// Overrides the remote store API key.
pub const STORE_KEY_ENV: &str = "TYPEWRITER_STORE_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Letters live only as long as the process
    #[default]
    Memory,
    /// Local redb file
    Redb,
    /// Hosted letter table
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    /// Database file for the `redb` backend
    pub path: PathBuf,
    /// Base URL for the `remote` backend
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: default_db_path(),
            url: None,
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

impl StorageConfig {
    /// Replace url and key with the given values where present.
    pub fn apply_overrides(&mut self, url: Option<String>, api_key: Option<String>) {
        if let Some(url) = url {
            self.url = Some(url);
        }
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
    }

    /// Apply `TYPEWRITER_STORE_URL` and `TYPEWRITER_STORE_KEY`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(STORE_URL_ENV).ok(),
            std::env::var(STORE_KEY_ENV).ok(),
        );
    }

    /// Connection settings for the remote backend.
    pub fn remote(&self) -> anyhow::Result<RemoteConfig> {
        let (Some(url), Some(key)) = (&self.url, &self.api_key) else {
            bail!("remote store needs a url and an api key (set {STORE_URL_ENV} and {STORE_KEY_ENV})");
        };
        let mut remote = RemoteConfig::new(url.as_str(), key.as_str());
        remote.timeout_ms = self.timeout_ms;
        Ok(remote)
    }

    /// Open the configured backend.
    pub fn open(&self) -> anyhow::Result<LetterStore> {
        let store = match self.backend {
            StoreBackend::Memory => LetterStore::new_in_memory(),
            StoreBackend::Redb => LetterStore::new_redb(&self.path)
                .with_context(|| format!("opening letter database {}", self.path.display()))?,
            StoreBackend::Remote => LetterStore::new_remote(self.remote()?)?,
        };
        Ok(store)
    }
}

/// `~/.typewriter/letters.redb`, or the working directory without a home.
fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".typewriter").join("letters.redb")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Machine mechanics and extra themes
    #[serde(flatten)]
    pub base: Config,

    /// Theme a session starts with
    pub theme: String,

    /// Ink a session starts with
    pub ink: InkColor,

    pub storage: StorageConfig,

    /// Directory exported PDFs are written to
    pub export_dir: PathBuf,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            base: Config::default(),
            theme: DEFAULT_THEME.to_string(),
            ink: InkColor::default(),
            storage: StorageConfig::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl DeskConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &Config {
        &self.base
    }

    /// Convert into the base config for use with `Typewriter::new()`
    pub fn into_base(self) -> Config {
        self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DeskConfig::default();
        assert_eq!(cfg.theme, "love");
        assert_eq!(cfg.ink, InkColor::Black);
        assert_eq!(cfg.storage.backend, StoreBackend::Memory);
        assert_eq!(cfg.base().max_chars_per_line, 48);
    }

    #[test]
    fn flattened_machine_keys_and_sections() {
        let cfg = DeskConfig::from_toml_str(
            r#"
max_chars_per_line = 40
theme = "vintage"
ink = "red"
export_dir = "out"

[storage]
backend = "redb"
path = "/tmp/letters.redb"
"#,
        )
        .unwrap();
        assert_eq!(cfg.base.max_chars_per_line, 40);
        assert_eq!(cfg.base.char_width, 11);
        assert_eq!(cfg.theme, "vintage");
        assert_eq!(cfg.ink, InkColor::Red);
        assert_eq!(cfg.export_dir, PathBuf::from("out"));
        assert_eq!(cfg.storage.backend, StoreBackend::Redb);
        assert_eq!(cfg.storage.path, PathBuf::from("/tmp/letters.redb"));
        assert_eq!(cfg.storage.timeout_ms, 10_000);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let mut storage = StorageConfig {
            url: Some("https://old.test".into()),
            api_key: Some("old".into()),
            ..StorageConfig::default()
        };
        storage.apply_overrides(Some("https://new.test".into()), None);
        assert_eq!(storage.url.as_deref(), Some("https://new.test"));
        assert_eq!(storage.api_key.as_deref(), Some("old"));
    }

    #[test]
    fn remote_without_credentials_is_rejected() {
        let storage = StorageConfig {
            backend: StoreBackend::Remote,
            ..StorageConfig::default()
        };
        assert!(storage.open().is_err());

        let storage = StorageConfig {
            url: Some("https://x.test".into()),
            api_key: Some("anon".into()),
            timeout_ms: 500,
            ..storage
        };
        let remote = storage.remote().unwrap();
        assert_eq!(remote.endpoint(), "https://x.test/rest/v1/letters");
        assert_eq!(remote.timeout_ms, 500);
    }

    #[test]
    fn redb_backend_opens_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            backend: StoreBackend::Redb,
            path: dir.path().join("letters.redb"),
            ..StorageConfig::default()
        };
        let store = storage.open().unwrap();
        assert_eq!(store.backend_name(), "redb");
    }
}

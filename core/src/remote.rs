//! Hosted letter table.
//!
//! Talks to a PostgREST-style endpoint (`/rest/v1/<table>`), authenticated
//! with an API key sent both as `apikey` and as a bearer token. The server
//! assigns `id` and `created_at`.
//!
//! Uses the `reqwest` blocking client: callers that must not block run the
//! store on a worker thread.

use crate::letter::{sort_newest_first, Letter};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the hosted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project base URL, e.g. `https://example.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_table() -> String {
    "letters".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: default_table(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// REST endpoint of the letter table.
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }
}

/// Insert payload. `id` and `created_at` come from the server.
#[derive(Debug, Serialize)]
struct NewRow<'a> {
    content: &'a [String],
    theme: &'a str,
}

/// Row ids may be uuids or bigint identities depending on the table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct Row {
    id: RowId,
    content: Vec<String>,
    theme: String,
    created_at: DateTime<Utc>,
}

impl From<Row> for Letter {
    fn from(row: Row) -> Self {
        let id = match row.id {
            RowId::Text(s) => s,
            RowId::Number(n) => n.to_string(),
        };
        Letter {
            id,
            content: row.content,
            theme: row.theme,
            created_at: row.created_at,
        }
    }
}

/// Client for the hosted letter table.
#[derive(Debug)]
pub struct RemoteLetterStore {
    client: reqwest::blocking::Client,
    config: RemoteConfig,
}

impl RemoteLetterStore {
    pub fn new(config: RemoteConfig) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// `POST` one row and return the inserted record.
    pub fn save_letter(&self, content: &[String], theme: &str) -> Result<Letter, StoreError> {
        let body = [NewRow { content, theme }];
        let response = self
            .client
            .post(self.config.endpoint())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()?;

        let response = check_status(response)?;
        let rows: Vec<Row> = response.json()?;
        let letter: Letter = rows.into_iter().next().ok_or(StoreError::NoRow)?.into();
        debug!(id = %letter.id, "letter saved remotely");
        Ok(letter)
    }

    /// `GET` every row ordered by `created_at` descending.
    pub fn get_letters(&self) -> Result<Vec<Letter>, StoreError> {
        let url = format!("{}?select=*&order=created_at.desc", self.config.endpoint());
        let response = self
            .client
            .get(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()?;

        let response = check_status(response)?;
        let rows: Vec<Row> = response.json()?;
        let mut letters: Vec<Letter> = rows.into_iter().map(Letter::from).collect();
        sort_newest_first(&mut letters);
        Ok(letters)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_table() {
        let cfg = RemoteConfig::new("https://example.supabase.co/", "anon");
        assert_eq!(cfg.endpoint(), "https://example.supabase.co/rest/v1/letters");
    }

    #[test]
    fn config_defaults_from_toml() {
        let cfg: RemoteConfig =
            toml::from_str("url = \"https://x.test\"\napi_key = \"k\"\n").unwrap();
        assert_eq!(cfg.table, "letters");
        assert_eq!(cfg.timeout_ms, 10_000);
    }

    #[test]
    fn rows_accept_text_and_numeric_ids() {
        let json = r#"[
            {"id": 42, "content": ["HELLO", "WORLD"], "theme": "love",
             "created_at": "2026-02-14T08:30:00.123456+00:00"},
            {"id": "9b2f", "content": [], "theme": "vintage",
             "created_at": "2026-02-13T08:30:00Z"}
        ]"#;
        let rows: Vec<Row> = serde_json::from_str(json).unwrap();
        let letters: Vec<Letter> = rows.into_iter().map(Letter::from).collect();
        assert_eq!(letters[0].id, "42");
        assert_eq!(letters[0].content, vec!["HELLO", "WORLD"]);
        assert_eq!(letters[1].id, "9b2f");
        assert!(letters[0].created_at > letters[1].created_at);
    }

    #[test]
    fn insert_payload_shape() {
        let content = vec!["a".to_string()];
        let body = [NewRow {
            content: &content,
            theme: "love",
        }];
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!([{"content": ["a"], "theme": "love"}]));
    }

    #[test]
    fn unreachable_service_is_an_error() {
        let mut cfg = RemoteConfig::new("http://127.0.0.1:9", "anon");
        cfg.timeout_ms = 200;
        let store = RemoteLetterStore::new(cfg).unwrap();
        assert!(store.get_letters().is_err());
        assert!(store.save_letter(&["x".to_string()], "love").is_err());
    }
}

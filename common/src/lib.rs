/*!
common/src/lib.rs

Shared configuration types and DB helper functions for Blogsum.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default config file with an override file
- A helper to open an SQLite connection pool
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default location of the document-store database when `[archive]` is absent.
pub const DEFAULT_ARCHIVE_PATH: &str = "data/archive.db";

/// Default hard timeout for fetching a blog page.
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// Structured store configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the sqlite database file holding summaries (e.g. "data/blogsum.db")
    pub path: String,
}

/// Document store configuration section (full-text archive)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub path: String,
    /// Collection name the full texts are written to
    pub collection: Option<String>,
}

/// HTTP listener configuration, merged into Rocket's figment at launch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Outbound page fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

/// Content extraction tuning. Every field falls back to the built-in defaults
/// when omitted, so a partial section only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Candidate container selectors, highest priority first
    pub content_selectors: Option<Vec<String>>,
    /// Non-content nodes ignored inside a candidate container
    pub noise_selectors: Option<Vec<String>>,
    /// Page chrome ignored by the full-page fallback
    pub chrome_selectors: Option<Vec<String>>,
    /// A candidate must exceed this many characters to be accepted
    pub min_tier_length: Option<usize>,
    /// Final content shorter than this is rejected
    pub min_content_length: Option<usize>,
    /// Content longer than this is truncated
    pub max_content_length: Option<usize>,
    /// Paragraphs at or below this length are skipped by the paragraph fallback
    pub min_paragraph_length: Option<usize>,
}

/// Translation dictionary source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// JSON word list; the bundled list is used when unset
    pub path: Option<String>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub archive: Option<ArchiveConfig>,
    pub server: Option<ServerConfig>,
    pub fetch: Option<FetchConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub dictionary: Option<DictionaryConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for (kind, path) in [("default", default_path), ("override", override_path)] {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {} config: {}", kind, path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse {} configuration", kind))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    pub fn archive_path(&self) -> &str {
        self.archive
            .as_ref()
            .map(|a| a.path.as_str())
            .unwrap_or(DEFAULT_ARCHIVE_PATH)
    }

    pub fn fetch_timeout(&self) -> Duration {
        let secs = self
            .fetch
            .as_ref()
            .and_then(|f| f.timeout_seconds)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS);
        Duration::from_secs(secs)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Initialize an SQLite connection pool.
///
/// This function will create the parent directory if necessary, ensure the DB file exists
/// (attempting to create it if missing), and return a configured `SqlitePool` in WAL mode.
/// Both the summary store and the full-text archive are opened through here; the pool is
/// shared by every request for the lifetime of the process.
///
/// Example:
///   let pool = init_db_pool("data/blogsum.db").await?;
pub async fn init_db_pool(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create DB parent directory: {}", parent.display())
        })?;
    }

    // Creating the file up front surfaces permission/path problems with a clearer error
    // than the SQLite connect would.
    tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to create or open DB file: {}", path))?;

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to sqlite database at path: {}", path))?;

    Ok(pool)
}

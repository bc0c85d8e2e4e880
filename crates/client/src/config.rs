//! Client configuration.

use std::path::PathBuf;

use crate::sqlite::default_storage_path;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the session is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Nothing survives the process.
    Memory,
    /// SQLite file at the given path.
    Sqlite(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, without a trailing slash (paths start with `/api/`).
    pub base_url: String,
    pub storage: StorageConfig,
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for `base_url` with in-memory session storage.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            storage: StorageConfig::Memory,
            user_agent: default_user_agent(),
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Read configuration from the environment.
    ///
    /// - `TASKHUB_API_URL`: backend origin (default `http://localhost:8000`)
    /// - `TASKHUB_STORAGE`: `memory`, or a path to the SQLite session file
    ///   (default `{data_dir}/taskhub/session.db`)
    pub fn from_env() -> Self {
        let base_url = std::env::var("TASKHUB_API_URL").unwrap_or_else(|_| {
            tracing::warn!("TASKHUB_API_URL not set; using {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });

        let storage = match std::env::var("TASKHUB_STORAGE") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("memory") => StorageConfig::Memory,
            Ok(raw) if !raw.trim().is_empty() => StorageConfig::Sqlite(PathBuf::from(raw.trim())),
            _ => match default_storage_path() {
                Ok(path) => StorageConfig::Sqlite(path),
                Err(err) => {
                    tracing::warn!(
                        "no durable storage location ({err:#}); session will not persist"
                    );
                    StorageConfig::Memory
                }
            },
        };

        Self::new(base_url).with_storage(storage)
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn default_user_agent() -> String {
    format!("taskhub-client/{}", env!("CARGO_PKG_VERSION"))
}

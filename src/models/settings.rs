use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::semantic_scholar::{ClientConfig, DEFAULT_BASE_URL};
use crate::adapters::openalex::OPENALEX_BASE_URL;
use crate::utils::http::RetryConfig;

/// Name of the per-user data directory.
pub const APP_DIR: &str = "scholar-digest";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub journal_db_path: Option<PathBuf>,
    pub semantic_scholar_base_url: String,
    pub openalex_base_url: String,
    pub request_interval_ms: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub pagination_pause_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            journal_db_path: None,
            semantic_scholar_base_url: DEFAULT_BASE_URL.to_string(),
            openalex_base_url: OPENALEX_BASE_URL.to_string(),
            request_interval_ms: 1100,
            max_attempts: 3,
            initial_backoff_ms: 5000,
            pagination_pause_ms: 5000,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Journal database location, defaulting to the user data directory.
    pub fn journal_db_path(&self) -> PathBuf {
        if let Some(path) = &self.journal_db_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("journal_impact.db")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.semantic_scholar_base_url.clone(),
            min_interval: Duration::from_millis(self.request_interval_ms),
            retry: RetryConfig {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                ..RetryConfig::default()
            },
            pagination_pause: Duration::from_millis(self.pagination_pause_ms),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::default()
        }
    }
}

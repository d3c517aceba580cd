//! Application configuration file support.
//!
//! Reads tracker credentials and the default status vocabulary from a TOML
//! configuration file, with environment-variable fallback for credentials.
//! The engine itself consumes no environment; everything is passed in
//! explicitly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{StatusVocabulary, VocabularyError};

/// Error raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(String),
    #[error("Failed to parse config file: {0}")]
    Parse(String),
    #[error("No cadence.toml found in standard locations")]
    NotFound,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub vocabulary: VocabularySettings,
}

/// Tracker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

/// Default status vocabulary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularySettings {
    #[serde(default = "default_in_progress")]
    pub in_progress: Vec<String>,
    #[serde(default = "default_done")]
    pub done: Vec<String>,
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub is_qa: bool,
}

impl Default for VocabularySettings {
    fn default() -> Self {
        Self {
            in_progress: default_in_progress(),
            done: default_done(),
            excluded: default_excluded(),
            is_qa: false,
        }
    }
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_in_progress() -> Vec<String> {
    vec!["In Progress".to_string()]
}

fn default_done() -> Vec<String> {
    vec!["Done".to_string()]
}

fn default_excluded() -> Vec<String> {
    vec!["Acceptance".to_string(), "Feedback".to_string()]
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `cadence.toml` in the current directory, a `config/`
    /// subdirectory, and the parent directory.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from("cadence.toml"),
            PathBuf::from("config/cadence.toml"),
            PathBuf::from("../cadence.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Load from the default location when present, fall back to built-in
    /// defaults otherwise, and apply environment overrides for credentials.
    pub fn load() -> Self {
        let mut config = Self::from_default_location().unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    /// Credentials from `TRACKER_BASE_URL`, `TRACKER_EMAIL`, and
    /// `TRACKER_API_TOKEN` take precedence over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("TRACKER_BASE_URL") {
            self.tracker.base_url = value.trim_end_matches('/').to_string();
        }
        if let Ok(value) = std::env::var("TRACKER_EMAIL") {
            self.tracker.email = value;
        }
        if let Ok(value) = std::env::var("TRACKER_API_TOKEN") {
            self.tracker.api_token = value;
        }
    }
}

impl VocabularySettings {
    /// Build the validated vocabulary.
    pub fn to_vocabulary(&self) -> Result<StatusVocabulary, VocabularyError> {
        StatusVocabulary::new(&self.in_progress, &self.done, &self.excluded, self.is_qa)
    }
}

#[cfg(feature = "remote-tracker")]
impl TrackerSettings {
    /// Convert to the REST client's configuration.
    pub fn to_client_config(&self) -> crate::tracker::TrackerClientConfig {
        let mut config = crate::tracker::TrackerClientConfig::new(
            self.base_url.clone(),
            self.email.clone(),
            self.api_token.clone(),
        );
        config.request_delay = std::time::Duration::from_millis(self.request_delay_ms);
        config
    }

    /// Whether all credentials are present.
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.api_token.trim().is_empty()
    }
}

//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional JSON config
//! file, then environment variables, then command-line overrides applied
//! by the CLI.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DELIMITER, DEFAULT_INITIAL_BACKOFF_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SOURCE_URL, ENV_EVENT_ENDPOINT,
    ENV_SOURCE_URL, FALLBACK_ROW_ID, MAX_RESOLUTION_PASSES,
};
use crate::error::{Result, ShowreelError};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings for fetching and resolving client content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// URL of the exported content table
    pub source_url: String,

    /// Column delimiter
    pub delimiter: char,

    /// Total fetch attempts
    pub max_attempts: u32,

    /// Backoff before the first retry, doubled per further failure
    pub initial_backoff_ms: u64,

    /// Upper bound on `basedOn` resolution passes
    pub max_resolution_passes: usize,

    /// Row chosen when the requested id is missing
    pub fallback_row_id: String,

    /// Timeout applied to each HTTP fetch
    pub request_timeout_secs: u64,

    /// Analytics endpoint; events are only logged locally when unset
    pub event_endpoint: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            delimiter: DEFAULT_DELIMITER,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_resolution_passes: MAX_RESOLUTION_PASSES,
            fallback_row_id: FALLBACK_ROW_ID.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            event_endpoint: None,
        }
    }
}

impl ResolverConfig {
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.initial_backoff_ms = backoff_ms;
        self
    }

    pub fn with_max_resolution_passes(mut self, passes: usize) -> Self {
        self.max_resolution_passes = passes;
        self
    }

    pub fn with_fallback_row_id(mut self, row_id: impl Into<String>) -> Self {
        self.fallback_row_id = row_id.into();
        self
    }

    pub fn with_event_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.event_endpoint = Some(endpoint.into());
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.initial_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Platform config location, e.g. `~/.config/showreel/config.json`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShowreelError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the given (or default-location) file, then environment
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SOURCE_URL).filter(|v| !v.trim().is_empty()) {
            debug!("Source URL overridden by {}", ENV_SOURCE_URL);
            self.source_url = url.trim().to_string();
        }
        if let Some(endpoint) = lookup(ENV_EVENT_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            debug!("Event endpoint overridden by {}", ENV_EVENT_ENDPOINT);
            self.event_endpoint = Some(endpoint.trim().to_string());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(ShowreelError::configuration("source_url must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(ShowreelError::configuration(
                "max_attempts must be at least 1",
            ));
        }
        if self.max_resolution_passes == 0 {
            return Err(ShowreelError::configuration(
                "max_resolution_passes must be at least 1",
            ));
        }
        if self.fallback_row_id.is_empty() {
            return Err(ShowreelError::configuration(
                "fallback_row_id must not be empty",
            ));
        }
        if self.delimiter == '\n' {
            return Err(ShowreelError::InvalidDelimiter {
                delimiter: "\\n".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a delimiter argument, which must be exactly one character
pub fn parse_delimiter(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '\n' => Ok(c),
        _ => Err(ShowreelError::InvalidDelimiter {
            delimiter: value.to_string(),
        }),
    }
}

//! Error handling for showreel content resolution.
//!
//! Only network exhaustion and configuration problems surface as errors.
//! Malformed table data degrades to blank fields and never reaches this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowreelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Table source not found at path: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Failed to fetch data after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid delimiter '{delimiter}': expected exactly one character")]
    InvalidDelimiter { delimiter: String },
}

impl ShowreelError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShowreelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = ShowreelError::HttpStatus {
            status: 503,
            url: "https://example.test/sheet.csv".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "HTTP error! status: 503 from https://example.test/sheet.csv"
        );
    }

    #[test]
    fn test_configuration_message() {
        let error = ShowreelError::configuration("max_attempts must be at least 1");
        assert!(error.to_string().contains("max_attempts"));
    }
}

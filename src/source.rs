//! Table sources: where the raw content table comes from.
//!
//! The resolver only needs the table text. The published spreadsheet export
//! is fetched over HTTP; a local file source serves offline runs.

use crate::error::{Result, ShowreelError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

#[async_trait]
pub trait TableSource: Send + Sync {
    /// Short description used in log lines
    fn describe(&self) -> String;

    /// Fetch the raw table text
    async fn fetch_table(&self) -> Result<String>;
}

/// Fetches the table from an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpTableSource {
    url: String,
    client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("showreel-resolver/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(name = "http_table_fetch", skip(self), fields(url = %self.url))]
    async fn fetch_table(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ShowreelError::HttpStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }
        let text = response.text().await?;
        debug!("Fetched {} bytes", text.len());
        Ok(text)
    }
}

/// Reads the table from a local file
#[derive(Debug, Clone)]
pub struct FileTableSource {
    path: PathBuf,
}

impl FileTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableSource for FileTableSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_table(&self) -> Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ShowreelError::SourceNotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => Err(ShowreelError::Io(e)),
        }
    }
}

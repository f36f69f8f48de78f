//! Fire-and-forget analytics events.
//!
//! Emitting an event never blocks and never fails the caller: delivery
//! problems are logged and dropped.

use crate::config::ResolverConfig;
use crate::error::{Result, ShowreelError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One analytics event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEvent {
    pub event_type: String,
    pub data: Value,
    pub occurred_at: DateTime<Utc>,
}

impl SiteEvent {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            occurred_at: Utc::now(),
        }
    }

    /// Form fields expected by the logging endpoint
    pub fn form_fields(&self) -> [(&'static str, String); 2] {
        [
            ("eventType", self.event_type.clone()),
            ("eventData", self.data.to_string()),
        ]
    }
}

pub trait EventSink: Send + Sync {
    fn log_event(&self, event: SiteEvent);
}

/// Writes events to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn log_event(&self, event: SiteEvent) {
        info!(
            event_type = %event.event_type,
            occurred_at = %event.occurred_at.to_rfc3339(),
            "Event: {}",
            event.data
        );
    }
}

/// Posts events to the analytics endpoint on a background task
#[derive(Debug, Clone)]
pub struct HttpEventSink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpEventSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one event and wait for the response
    pub async fn deliver(&self, event: &SiteEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&event.form_fields())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ShowreelError::HttpStatus {
                status: response.status().as_u16(),
                url: self.endpoint.clone(),
            });
        }
        Ok(())
    }
}

impl EventSink for HttpEventSink {
    fn log_event(&self, event: SiteEvent) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                "No async runtime; dropping analytics event '{}'",
                event.event_type
            );
            return;
        };

        let sink = self.clone();
        runtime.spawn(async move {
            match sink.deliver(&event).await {
                Ok(()) => debug!("Analytics event '{}' delivered", event.event_type),
                Err(e) => error!("Failed to send analytics event: {}", e),
            }
        });
    }
}

/// HTTP sink when an endpoint is configured, otherwise log-only
pub fn sink_from_config(config: &ResolverConfig) -> Result<Arc<dyn EventSink>> {
    match &config.event_endpoint {
        Some(endpoint) => Ok(Arc::new(HttpEventSink::new(
            endpoint.clone(),
            config.request_timeout(),
        )?)),
        None => Ok(Arc::new(TracingEventSink)),
    }
}

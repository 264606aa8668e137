//! Publication sink wiring.
//!
//! The actual publication transport (webhooks, DNS provider APIs) lives
//! outside this system. The daemon ships a sink that hands the canonical
//! event to the operator's log pipeline; deployments with a push endpoint
//! configure [`HttpPublicationSink`] instead.

use async_trait::async_trait;
use tracing::info;

use zonegov_engine::{ExecutionEvent, PublicationSink, UpstreamError};

/// Emits execution events as structured log records.
pub struct LogPublicationSink;

#[async_trait]
impl PublicationSink for LogPublicationSink {
    async fn publish(&self, event: &ExecutionEvent) -> Result<(), UpstreamError> {
        info!(
            proposal = %event.proposal_id,
            execution_ref = %event.execution_ref,
            executed_at = event.executed_at.as_secs(),
            payload_hex = %event.payload_hex,
            "execution event published"
        );
        Ok(())
    }
}

/// POSTs the execution event as JSON to a configured endpoint.
pub struct HttpPublicationSink {
    url: String,
    client: reqwest::Client,
}

impl HttpPublicationSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PublicationSink for HttpPublicationSink {
    async fn publish(&self, event: &ExecutionEvent) -> Result<(), UpstreamError> {
        self.client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| UpstreamError(format!("publish to {}: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| UpstreamError(format!("publication endpoint rejected event: {e}")))?;
        Ok(())
    }
}

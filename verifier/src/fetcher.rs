//! Live-state fetcher port and its HTTP implementation.

use async_trait::async_trait;
use serde_json::Value;

use zonegov_engine::UpstreamError;

/// Retrieves the currently published configuration for comparison.
#[async_trait]
pub trait LiveStateFetcher: Send + Sync {
    async fn fetch_live(&self) -> Result<Value, UpstreamError>;
}

/// Fetches the live state as JSON from a canonical HTTP location.
pub struct HttpStateFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpStateFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LiveStateFetcher for HttpStateFetcher {
    async fn fetch_live(&self) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpstreamError(format!("fetch live state from {}: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| UpstreamError(format!("live state endpoint returned error: {e}")))?;

        response
            .json()
            .await
            .map_err(|e| UpstreamError(format!("live state is not valid JSON: {e}")))
    }
}

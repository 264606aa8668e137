//! HTTP member-power source for the registry sync job.
//!
//! Expects the endpoint to answer a JSON array of
//! `{ "id": "...", "voting_power": 10, "active": true }` entries.

use async_trait::async_trait;
use serde::Deserialize;

use zonegov_engine::{MemberPowerSource, RosterEntry, UpstreamError};
use zonegov_types::MemberId;

#[derive(Deserialize)]
struct RosterEntryDto {
    id: String,
    voting_power: u64,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

pub struct HttpPowerSource {
    url: String,
    client: reqwest::Client,
}

impl HttpPowerSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MemberPowerSource for HttpPowerSource {
    async fn fetch_roster(&self) -> Result<Vec<RosterEntry>, UpstreamError> {
        let entries: Vec<RosterEntryDto> = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpstreamError(format!("fetch roster from {}: {e}", self.url)))?
            .error_for_status()
            .map_err(|e| UpstreamError(format!("power source returned error: {e}")))?
            .json()
            .await
            .map_err(|e| UpstreamError(format!("roster is not valid JSON: {e}")))?;

        Ok(entries
            .into_iter()
            .map(|e| RosterEntry {
                id: MemberId::new(e.id),
                voting_power: e.voting_power,
                active: e.active,
            })
            .collect())
    }
}

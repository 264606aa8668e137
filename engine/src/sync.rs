//! Registry sync job — mirrors the external member-power source into the
//! member store.

use std::collections::HashSet;
use std::sync::Arc;

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::ports::MemberPowerSource;

/// Polls a [`MemberPowerSource`] and upserts the roster. The scheduler in
/// the daemon decides cadence and backoff; a failed poll leaves the
/// previous roster untouched.
pub struct RegistrySync {
    engine: Arc<GovernanceEngine>,
    source: Arc<dyn MemberPowerSource>,
}

impl RegistrySync {
    pub fn new(engine: Arc<GovernanceEngine>, source: Arc<dyn MemberPowerSource>) -> Self {
        Self { engine, source }
    }

    /// One poll. Returns the size of the fetched roster.
    ///
    /// Members the source no longer reports are deactivated, never deleted:
    /// their historical votes stay for audit.
    pub async fn run_once(&self) -> Result<usize, GovernanceError> {
        let roster = self
            .source
            .fetch_roster()
            .await
            .map_err(|e| GovernanceError::Upstream(e.to_string()))?;

        let mut seen = HashSet::new();
        for entry in &roster {
            seen.insert(entry.id.clone());
            self.engine
                .upsert_member(&entry.id, entry.voting_power, entry.active)?;
        }

        for member in self.engine.list_members()? {
            if member.active && !seen.contains(&member.id) {
                self.engine
                    .upsert_member(&member.id, member.voting_power, false)?;
            }
        }

        tracing::debug!(members = roster.len(), "registry sync complete");
        Ok(roster.len())
    }
}


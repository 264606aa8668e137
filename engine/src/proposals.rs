//! Proposal creation and read access.

use serde_json::Value;

use zonegov_store::{ProposalFilter, ProposalRecord, ProposalStore};
use zonegov_types::{ProposalId, ProposalStatus, ZoneDocument};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;

impl GovernanceEngine {
    /// Validate and persist a new Pending proposal.
    ///
    /// The quorum threshold is snapshotted here and never changes afterwards,
    /// even if the engine's default changes later.
    pub fn create_proposal(
        &self,
        payload: Value,
        quorum_threshold_percent: Option<u8>,
    ) -> Result<ProposalRecord, GovernanceError> {
        let document = ZoneDocument::from_value(payload)?;
        document.validate(&self.governed_domain)?;

        let threshold = quorum_threshold_percent.unwrap_or(self.default_quorum_percent);
        if !(1..=100).contains(&threshold) {
            return Err(GovernanceError::Validation(format!(
                "quorum threshold {threshold}% outside [1, 100]"
            )));
        }

        let _guard = self.lock();
        let id = self.store.next_proposal_id()?;
        let record = ProposalRecord {
            id,
            payload: document,
            quorum_threshold_percent: threshold,
            approval_weight: 0,
            status: ProposalStatus::Pending,
            created_at: self.clock.now(),
            executed_at: None,
            execution_ref: None,
        };
        self.store.put_proposal(&record)?;

        tracing::info!(proposal = %id, threshold, "proposal created");
        Ok(record)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, GovernanceError> {
        Ok(self.store.get_proposal(id)?)
    }

    pub fn list_proposals(
        &self,
        filter: ProposalFilter,
    ) -> Result<Vec<ProposalRecord>, GovernanceError> {
        Ok(self.store.list_proposals(filter)?)
    }
}


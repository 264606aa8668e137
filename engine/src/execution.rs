//! Execution — the Pending→Executed transition and the publication event.

use serde::{Deserialize, Serialize};

use zonegov_store::{MemberStore, ProposalRecord, ProposalStore};
use zonegov_types::{
    ExecutionRef, PayloadError, ProposalId, ProposalStatus, Timestamp, ZoneDocument,
};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::quorum;

/// The canonical event handed to the publication sink when a proposal
/// executes. Carries the full payload so the sink needs no read access to
/// governance state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub proposal_id: ProposalId,
    pub execution_ref: ExecutionRef,
    pub executed_at: Timestamp,
    /// Canonical JSON of the zone document, hex-encoded.
    pub payload_hex: String,
}

impl ExecutionEvent {
    pub fn new(
        proposal: &ProposalRecord,
        execution_ref: ExecutionRef,
        executed_at: Timestamp,
    ) -> Self {
        Self {
            proposal_id: proposal.id,
            execution_ref,
            executed_at,
            payload_hex: hex::encode(proposal.payload.canonical_json()),
        }
    }

    /// Decode the carried payload back into a zone document.
    pub fn decode_payload(&self) -> Result<ZoneDocument, PayloadError> {
        let bytes = hex::decode(&self.payload_hex)
            .map_err(|e| PayloadError::Malformed(e.to_string()))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| PayloadError::Malformed(e.to_string()))?;
        ZoneDocument::from_value(value)
    }
}

impl GovernanceEngine {
    /// Execute a proposal whose approval weight clears its quorum threshold.
    ///
    /// Quorum is re-evaluated from the live ballots under the governance
    /// lock, then the Pending→Executed transition goes through the store's
    /// compare-and-swap — if two callers race, exactly one wins and the
    /// loser gets [`GovernanceError::AlreadyExecuted`], which callers treat
    /// as success.
    ///
    /// Publication happens after the transition has committed and outside
    /// the lock. A sink failure surfaces as
    /// [`GovernanceError::Upstream`]; the proposal stays Executed and the
    /// caller retries via [`GovernanceEngine::retry_publication`] with the
    /// same execution ref.
    pub async fn execute(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ProposalRecord, GovernanceError> {
        let (executed, event) = {
            let _guard = self.lock();

            let proposal = self.store.get_proposal(proposal_id)?.ok_or_else(|| {
                GovernanceError::Validation(format!("unknown proposal {proposal_id}"))
            })?;
            if proposal.status == ProposalStatus::Executed {
                return Err(GovernanceError::AlreadyExecuted(proposal_id));
            }

            let total = self.store.total_active_power()?;
            let have = self.tally_for(proposal_id)?;
            if !quorum::is_executable(have, proposal.quorum_threshold_percent, total) {
                tracing::debug!(
                    proposal = %proposal_id,
                    have,
                    total,
                    need_percent = proposal.quorum_threshold_percent,
                    "execute attempted below quorum"
                );
                return Err(GovernanceError::QuorumNotMet {
                    have,
                    total,
                    need_percent: proposal.quorum_threshold_percent,
                });
            }

            let executed_at = self.clock.now();
            let execution_ref = ExecutionRef::new(hex::encode(rand::random::<[u8; 16]>()));
            if !self
                .store
                .mark_executed(proposal_id, executed_at, &execution_ref)?
            {
                return Err(GovernanceError::AlreadyExecuted(proposal_id));
            }

            let executed = self.store.get_proposal(proposal_id)?.ok_or_else(|| {
                GovernanceError::Validation(format!("unknown proposal {proposal_id}"))
            })?;
            tracing::info!(
                proposal = %proposal_id,
                execution_ref = %execution_ref,
                approval_weight = have,
                total_active_power = total,
                "proposal executed"
            );
            let event = ExecutionEvent::new(&executed, execution_ref, executed_at);
            (executed, event)
        };

        if let Err(e) = self.sink.publish(&event).await {
            tracing::warn!(
                proposal = %proposal_id,
                execution_ref = %event.execution_ref,
                error = %e,
                "publication failed after execution commit; retry with the same ref"
            );
            return Err(GovernanceError::Upstream(e.to_string()));
        }

        Ok(executed)
    }

    /// Re-emit the execution event of an already-executed proposal to the
    /// publication sink. Never touches votes, quorum, or status.
    pub async fn retry_publication(
        &self,
        proposal_id: ProposalId,
    ) -> Result<ExecutionEvent, GovernanceError> {
        let proposal = self.store.get_proposal(proposal_id)?.ok_or_else(|| {
            GovernanceError::Validation(format!("unknown proposal {proposal_id}"))
        })?;
        let (execution_ref, executed_at) = match (&proposal.execution_ref, proposal.executed_at)
        {
            (Some(r), Some(t)) => (r.clone(), t),
            _ => {
                return Err(GovernanceError::Conflict(format!(
                    "proposal {proposal_id} has not executed; nothing to publish"
                )))
            }
        };

        let event = ExecutionEvent::new(&proposal, execution_ref, executed_at);
        self.sink
            .publish(&event)
            .await
            .map_err(|e| GovernanceError::Upstream(e.to_string()))?;
        Ok(event)
    }
}


//! Member registry — roster upserts and total active voting power.
//!
//! The registry has no untrusted callers: it is written only by the
//! privileged sync job (see [`crate::sync`]). Voting power is unsigned by
//! construction; the cap below keeps the `weight * 100` quorum arithmetic
//! comfortably inside u128 even for absurd rosters.

use zonegov_store::{MemberRecord, MemberStore, ProposalFilter, ProposalStore};
use zonegov_types::MemberId;

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;

/// Upper bound on a single member's voting power.
pub const MAX_VOTING_POWER: u64 = u32::MAX as u64;

impl GovernanceEngine {
    /// Insert or update a member record.
    ///
    /// Changing a member's active flag re-tallies every pending proposal,
    /// so a deactivated approver stops counting without having to re-vote.
    pub fn upsert_member(
        &self,
        id: &MemberId,
        voting_power: u64,
        active: bool,
    ) -> Result<(), GovernanceError> {
        if !id.is_valid() {
            return Err(GovernanceError::Validation(
                "member id must not be empty".to_string(),
            ));
        }
        if voting_power > MAX_VOTING_POWER {
            return Err(GovernanceError::Validation(format!(
                "voting power {voting_power} exceeds maximum {MAX_VOTING_POWER}"
            )));
        }

        let _guard = self.lock();
        let previous = self.store.get_member(id)?;
        let record = MemberRecord {
            id: id.clone(),
            voting_power,
            active,
            updated_at: self.clock.now(),
        };
        self.store.put_member(&record)?;

        let activity_changed = previous.map(|p| p.active != active).unwrap_or(false);
        if activity_changed {
            self.retally_pending_proposals()?;
        }

        tracing::debug!(member = %id, power = voting_power, active, "member upserted");
        Ok(())
    }

    /// Sum of voting power over all active members.
    pub fn total_active_voting_power(&self) -> Result<u64, GovernanceError> {
        Ok(self.store.total_active_power()?)
    }

    pub fn member(&self, id: &MemberId) -> Result<Option<MemberRecord>, GovernanceError> {
        Ok(self.store.get_member(id)?)
    }

    pub fn list_members(&self) -> Result<Vec<MemberRecord>, GovernanceError> {
        Ok(self.store.list_members()?)
    }

    /// Recompute and persist the approval weight of every pending proposal.
    /// Caller must hold the governance lock.
    pub(crate) fn retally_pending_proposals(&self) -> Result<(), GovernanceError> {
        for mut proposal in self.store.list_proposals(ProposalFilter::Pending)? {
            let weight = self.tally_for(proposal.id)?;
            if weight != proposal.approval_weight {
                tracing::debug!(
                    proposal = %proposal.id,
                    old = proposal.approval_weight,
                    new = weight,
                    "approval weight re-tallied after roster change"
                );
                proposal.approval_weight = weight;
                self.store.put_proposal(&proposal)?;
            }
        }
        Ok(())
    }
}


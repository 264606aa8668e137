//! Ballot casting and tally recomputation.

use serde::Serialize;

use zonegov_store::{GovernanceStore, MemberStore, ProposalStore, VoteRecord, VoteStore};
use zonegov_types::{MemberId, ProposalId, ProposalStatus, VoteChoice};

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::quorum;

/// The tally as of the commit of one ballot.
#[derive(Clone, Debug, Serialize)]
pub struct VoteTally {
    pub proposal_id: ProposalId,
    pub approval_weight: u64,
    pub quorum_threshold_percent: u8,
    pub total_active_power: u64,
    pub executable: bool,
}

impl GovernanceEngine {
    /// Cast (or change) a member's ballot on a pending proposal.
    ///
    /// Runs under the governance lock: the ballot upsert, the tally
    /// recomputation, and the persisted approval weight always belong to one
    /// consistent snapshot — a re-vote can never leave the old and the new
    /// ballot both counted.
    ///
    /// Inactive and zero-power members may vote; the ballot is retained for
    /// audit and contributes zero weight.
    pub fn cast_vote(
        &self,
        proposal_id: ProposalId,
        member_id: &MemberId,
        choice: VoteChoice,
    ) -> Result<VoteTally, GovernanceError> {
        let _guard = self.lock();

        let member = self
            .store
            .get_member(member_id)?
            .ok_or_else(|| GovernanceError::Validation(format!("unknown member {member_id}")))?;
        let proposal = self
            .store
            .get_proposal(proposal_id)?
            .ok_or_else(|| {
                GovernanceError::Validation(format!("unknown proposal {proposal_id}"))
            })?;
        if proposal.status == ProposalStatus::Executed {
            return Err(GovernanceError::Conflict(format!(
                "voting is closed: proposal {proposal_id} is already executed"
            )));
        }

        let vote = VoteRecord {
            proposal_id,
            member_id: member_id.clone(),
            weight: member.voting_power,
            choice,
            cast_at: self.clock.now(),
        };

        let approval_weight = self.tally_with_ballot(proposal_id, &vote)?;
        self.store.apply_vote(&vote, approval_weight)?;

        let total_active_power = self.store.total_active_power()?;
        let executable = quorum::is_executable(
            approval_weight,
            proposal.quorum_threshold_percent,
            total_active_power,
        );

        tracing::info!(
            proposal = %proposal_id,
            member = %member_id,
            choice = %choice,
            weight = vote.weight,
            approval_weight,
            executable,
            "vote cast"
        );

        Ok(VoteTally {
            proposal_id,
            approval_weight,
            quorum_threshold_percent: proposal.quorum_threshold_percent,
            total_active_power,
            executable,
        })
    }

    /// All ballots on a proposal, for audit.
    pub fn votes(&self, proposal_id: ProposalId) -> Result<Vec<VoteRecord>, GovernanceError> {
        Ok(self.store.votes_for(proposal_id)?)
    }

    /// Approval weight from the stored ballots: the sum of snapshotted
    /// weights over approve votes whose voter is currently active.
    pub(crate) fn tally_for(&self, proposal_id: ProposalId) -> Result<u64, GovernanceError> {
        let votes = self.store.votes_for(proposal_id)?;
        self.sum_approvals(votes.iter())
    }

    /// Tally with `ballot` superseding any stored ballot from the same
    /// member — used before the upsert commits so the persisted weight
    /// matches the post-upsert vote set.
    fn tally_with_ballot(
        &self,
        proposal_id: ProposalId,
        ballot: &VoteRecord,
    ) -> Result<u64, GovernanceError> {
        let mut votes = self.store.votes_for(proposal_id)?;
        votes.retain(|v| v.member_id != ballot.member_id);
        votes.push(ballot.clone());
        self.sum_approvals(votes.iter())
    }

    fn sum_approvals<'a>(
        &self,
        votes: impl Iterator<Item = &'a VoteRecord>,
    ) -> Result<u64, GovernanceError> {
        let mut weight = 0u64;
        for vote in votes {
            if vote.choice != VoteChoice::Approve {
                continue;
            }
            let active = self
                .store
                .get_member(&vote.member_id)?
                .map(|m| m.active)
                .unwrap_or(false);
            if active {
                weight = weight.saturating_add(vote.weight);
            }
        }
        Ok(weight)
    }
}


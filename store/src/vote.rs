//! Vote records and their storage trait.

use serde::{Deserialize, Serialize};
use zonegov_types::{MemberId, ProposalId, Timestamp, VoteChoice};

use crate::StoreError;

/// A single ballot, unique per `(proposal_id, member_id)`.
///
/// `weight` is the member's voting power snapshotted at cast time. The
/// tally counts it only while the member is active; the row itself is kept
/// for audit either way.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal_id: ProposalId,
    pub member_id: MemberId,
    pub weight: u64,
    pub choice: VoteChoice,
    pub cast_at: Timestamp,
}

/// Storage for votes. Writes go through
/// [`crate::GovernanceStore::apply_vote`] so the ballot upsert and the
/// proposal tally always land together.
pub trait VoteStore {
    /// Get a member's current ballot on a proposal.
    fn get_vote(
        &self,
        proposal_id: ProposalId,
        member_id: &MemberId,
    ) -> Result<Option<VoteRecord>, StoreError>;

    /// All ballots on a proposal, one per member.
    fn votes_for(&self, proposal_id: ProposalId) -> Result<Vec<VoteRecord>, StoreError>;
}

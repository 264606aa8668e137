//! Proposal records and their storage trait.

use serde::{Deserialize, Serialize};
use zonegov_types::{ExecutionRef, ProposalId, ProposalStatus, Timestamp, ZoneDocument};

use crate::StoreError;

/// A proposal as persisted.
///
/// `quorum_threshold_percent` is snapshotted at creation and never changes.
/// `approval_weight` is derived state: the sum of vote weights of currently
/// active members whose ballot is Approve, maintained by
/// [`crate::GovernanceStore::apply_vote`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub payload: ZoneDocument,
    pub quorum_threshold_percent: u8,
    pub approval_weight: u64,
    pub status: ProposalStatus,
    pub created_at: Timestamp,
    pub executed_at: Option<Timestamp>,
    pub execution_ref: Option<ExecutionRef>,
}

/// Filter for proposal listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProposalFilter {
    #[default]
    All,
    Pending,
    Executed,
}

impl ProposalFilter {
    pub fn matches(&self, status: ProposalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => status == ProposalStatus::Pending,
            Self::Executed => status == ProposalStatus::Executed,
        }
    }
}

/// Storage for proposals.
pub trait ProposalStore {
    /// Allocate the next proposal id. Ids are unique and increasing.
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError>;

    /// Insert or replace a proposal record.
    fn put_proposal(&self, record: &ProposalRecord) -> Result<(), StoreError>;

    /// Get a proposal by id.
    fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, StoreError>;

    /// List proposals matching `filter`, ordered by id.
    fn list_proposals(&self, filter: ProposalFilter) -> Result<Vec<ProposalRecord>, StoreError>;

    /// Compare-and-swap the Pending→Executed transition.
    ///
    /// Returns `Ok(true)` if this call performed the transition, `Ok(false)`
    /// if the proposal was already Executed (the caller lost the race), and
    /// [`StoreError::NotFound`] if the proposal does not exist. Backends must
    /// re-read the row inside their own write transaction so two racing
    /// callers cannot both observe Pending.
    fn mark_executed(
        &self,
        id: ProposalId,
        executed_at: Timestamp,
        execution_ref: &ExecutionRef,
    ) -> Result<bool, StoreError>;

    /// The most recently executed proposal: latest `executed_at`, ties
    /// broken by the higher id. `None` when nothing has executed yet.
    fn latest_executed(&self) -> Result<Option<ProposalRecord>, StoreError> {
        Ok(self
            .list_proposals(ProposalFilter::Executed)?
            .into_iter()
            .max_by_key(|p| (p.executed_at, p.id)))
    }
}

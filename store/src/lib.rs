//! Abstract storage traits for zonegov governance state.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.
//!
//! Two operations are deliberately compound so backends can make them atomic
//! at the storage layer: [`GovernanceStore::apply_vote`] (ballot upsert plus
//! tally persist) and [`proposal::ProposalStore::mark_executed`] (the
//! Pending→Executed compare-and-swap).

pub mod error;
pub mod member;
pub mod proposal;
pub mod vote;

pub use error::StoreError;
pub use member::{MemberRecord, MemberStore};
pub use proposal::{ProposalFilter, ProposalRecord, ProposalStore};
pub use vote::{VoteRecord, VoteStore};

/// The full governance store: members, proposals, and votes behind one
/// handle, plus the compound vote-upsert operation that spans two tables.
pub trait GovernanceStore: MemberStore + ProposalStore + VoteStore + Send + Sync {
    /// Atomically upsert `vote` (replacing any prior ballot from the same
    /// member) and persist `approval_weight` on its proposal row.
    ///
    /// Returns [`StoreError::NotFound`] if the proposal does not exist.
    fn apply_vote(&self, vote: &VoteRecord, approval_weight: u64) -> Result<(), StoreError>;
}

/// Convenience alias used by the engine and the daemon wiring.
pub type SharedStore = std::sync::Arc<dyn GovernanceStore>;

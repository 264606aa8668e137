//! Member records and their storage trait.

use serde::{Deserialize, Serialize};
use zonegov_types::{MemberId, Timestamp};

use crate::StoreError;

/// A voting member as persisted by the registry.
///
/// Members are written only by the registry sync job; deactivated members
/// keep their row (and their historical votes) but stop counting toward
/// total active power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: MemberId,
    pub voting_power: u64,
    pub active: bool,
    pub updated_at: Timestamp,
}

/// Storage for the member roster.
pub trait MemberStore {
    /// Insert or replace a member record.
    fn put_member(&self, record: &MemberRecord) -> Result<(), StoreError>;

    /// Get a member by id.
    fn get_member(&self, id: &MemberId) -> Result<Option<MemberRecord>, StoreError>;

    /// All member records, active and inactive.
    fn list_members(&self) -> Result<Vec<MemberRecord>, StoreError>;

    /// Sum of `voting_power` over all active members.
    ///
    /// Callers that feed this into a quorum decision must hold the engine's
    /// governance lock so the total cannot drift between read and verdict.
    fn total_active_power(&self) -> Result<u64, StoreError> {
        Ok(self
            .list_members()?
            .iter()
            .filter(|m| m.active)
            .fold(0u64, |acc, m| acc.saturating_add(m.voting_power)))
    }
}

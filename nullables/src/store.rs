//! Nullable store — thread-safe in-memory governance storage for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use zonegov_store::{
    GovernanceStore, MemberRecord, MemberStore, ProposalFilter, ProposalRecord, ProposalStore,
    StoreError, VoteRecord, VoteStore,
};
use zonegov_types::{ExecutionRef, MemberId, ProposalId, ProposalStatus, Timestamp};

/// An in-memory governance store.
///
/// Every table sits behind its own mutex; the compound operations take the
/// locks they need for the whole operation, matching the atomicity the
/// LMDB backend gets from its write transactions.
pub struct NullGovernanceStore {
    members: Mutex<BTreeMap<String, MemberRecord>>,
    proposals: Mutex<BTreeMap<u64, ProposalRecord>>,
    votes: Mutex<BTreeMap<(u64, String), VoteRecord>>,
    next_proposal_id: AtomicU64,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(BTreeMap::new()),
            proposals: Mutex::new(BTreeMap::new()),
            votes: Mutex::new(BTreeMap::new()),
            next_proposal_id: AtomicU64::new(1),
        }
    }
}

impl Default for NullGovernanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberStore for NullGovernanceStore {
    fn put_member(&self, record: &MemberRecord) -> Result<(), StoreError> {
        self.members
            .lock()
            .unwrap()
            .insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn get_member(&self, id: &MemberId) -> Result<Option<MemberRecord>, StoreError> {
        Ok(self.members.lock().unwrap().get(id.as_str()).cloned())
    }

    fn list_members(&self) -> Result<Vec<MemberRecord>, StoreError> {
        Ok(self.members.lock().unwrap().values().cloned().collect())
    }
}

impl ProposalStore for NullGovernanceStore {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        Ok(ProposalId::new(
            self.next_proposal_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    fn put_proposal(&self, record: &ProposalRecord) -> Result<(), StoreError> {
        self.proposals
            .lock()
            .unwrap()
            .insert(record.id.as_u64(), record.clone());
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, StoreError> {
        Ok(self.proposals.lock().unwrap().get(&id.as_u64()).cloned())
    }

    fn list_proposals(&self, filter: ProposalFilter) -> Result<Vec<ProposalRecord>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p.status))
            .cloned()
            .collect())
    }

    fn mark_executed(
        &self,
        id: ProposalId,
        executed_at: Timestamp,
        execution_ref: &ExecutionRef,
    ) -> Result<bool, StoreError> {
        let mut proposals = self.proposals.lock().unwrap();
        let record = proposals
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;

        // CAS under the table lock: only one racing caller sees Pending.
        if record.status == ProposalStatus::Executed {
            return Ok(false);
        }
        record.status = ProposalStatus::Executed;
        record.executed_at = Some(executed_at);
        record.execution_ref = Some(execution_ref.clone());
        Ok(true)
    }
}

impl VoteStore for NullGovernanceStore {
    fn get_vote(
        &self,
        proposal_id: ProposalId,
        member_id: &MemberId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .get(&(proposal_id.as_u64(), member_id.as_str().to_string()))
            .cloned())
    }

    fn votes_for(&self, proposal_id: ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .range((proposal_id.as_u64(), String::new())..)
            .take_while(|((pid, _), _)| *pid == proposal_id.as_u64())
            .map(|(_, v)| v.clone())
            .collect())
    }
}

impl GovernanceStore for NullGovernanceStore {
    fn apply_vote(&self, vote: &VoteRecord, approval_weight: u64) -> Result<(), StoreError> {
        // Both locks for the whole operation: ballot and tally land together.
        let mut proposals = self.proposals.lock().unwrap();
        let mut votes = self.votes.lock().unwrap();

        let proposal = proposals
            .get_mut(&vote.proposal_id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", vote.proposal_id)))?;

        votes.insert(
            (
                vote.proposal_id.as_u64(),
                vote.member_id.as_str().to_string(),
            ),
            vote.clone(),
        );
        proposal.approval_weight = approval_weight;
        Ok(())
    }
}

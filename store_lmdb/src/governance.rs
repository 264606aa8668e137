//! LMDB implementation of the governance storage traits.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use zonegov_store::{
    GovernanceStore, MemberRecord, MemberStore, ProposalFilter, ProposalRecord, ProposalStore,
    StoreError, VoteRecord, VoteStore,
};
use zonegov_types::{ExecutionRef, MemberId, ProposalId, ProposalStatus, Timestamp};

use crate::LmdbError;

const NEXT_PROPOSAL_ID_KEY: &[u8] = b"next_proposal_id";

/// All governance tables behind one handle. Cheap to clone; clones share
/// the underlying environment.
#[derive(Clone)]
pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) members_db: Database<Bytes, Bytes>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

fn proposal_key(id: ProposalId) -> [u8; 8] {
    id.as_u64().to_be_bytes()
}

// Proposal rows embed the zone payload, which is arbitrary JSON; bincode
// cannot round-trip `serde_json::Value`, so these rows are JSON-encoded.
// Member and vote rows are plain structs and stay bincode.
fn encode_proposal(record: &ProposalRecord) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_proposal(bytes: &[u8]) -> Result<ProposalRecord, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Composite vote key: big-endian proposal id, then the member id bytes.
/// Lexicographic key order groups all ballots of a proposal together, so
/// `votes_for` is a prefix scan.
fn vote_key(proposal_id: ProposalId, member_id: &MemberId) -> Vec<u8> {
    let mut key = proposal_key(proposal_id).to_vec();
    key.extend_from_slice(member_id.as_str().as_bytes());
    key
}

impl MemberStore for LmdbGovernanceStore {
    fn put_member(&self, record: &MemberRecord) -> Result<(), StoreError> {
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.members_db
            .put(&mut wtxn, record.id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_member(&self, id: &MemberId) -> Result<Option<MemberRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .members_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn list_members(&self) -> Result<Vec<MemberRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.members_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut members = Vec::new();
        for entry in iter {
            let (_key, bytes) = entry.map_err(LmdbError::from)?;
            members.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(members)
    }
}

impl ProposalStore for LmdbGovernanceStore {
    fn next_proposal_id(&self) -> Result<ProposalId, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let next = self
            .meta_db
            .get(&wtxn, NEXT_PROPOSAL_ID_KEY)
            .map_err(LmdbError::from)?
            .and_then(|b| b.try_into().ok().map(u64::from_be_bytes))
            .unwrap_or(1);
        self.meta_db
            .put(&mut wtxn, NEXT_PROPOSAL_ID_KEY, &(next + 1).to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(ProposalId::new(next))
    }

    fn put_proposal(&self, record: &ProposalRecord) -> Result<(), StoreError> {
        let bytes = encode_proposal(record)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.proposals_db
            .put(&mut wtxn, &proposal_key(record.id), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .proposals_db
            .get(&rtxn, &proposal_key(id))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode_proposal(bytes)?)),
            None => Ok(None),
        }
    }

    fn list_proposals(&self, filter: ProposalFilter) -> Result<Vec<ProposalRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.proposals_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut proposals = Vec::new();
        for entry in iter {
            let (_key, bytes) = entry.map_err(LmdbError::from)?;
            let record = decode_proposal(bytes)?;
            if filter.matches(record.status) {
                proposals.push(record);
            }
        }
        Ok(proposals)
    }

    fn mark_executed(
        &self,
        id: ProposalId,
        executed_at: Timestamp,
        execution_ref: &ExecutionRef,
    ) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let key = proposal_key(id);
        let mut record: ProposalRecord = match self
            .proposals_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_proposal(bytes)?,
            None => return Err(StoreError::NotFound(format!("proposal {id}"))),
        };

        // The CAS: the status check happens inside this write transaction,
        // so only one of two racing callers can observe Pending.
        if record.status == ProposalStatus::Executed {
            return Ok(false);
        }

        record.status = ProposalStatus::Executed;
        record.executed_at = Some(executed_at);
        record.execution_ref = Some(execution_ref.clone());
        let bytes = encode_proposal(&record)?;
        self.proposals_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}

impl VoteStore for LmdbGovernanceStore {
    fn get_vote(
        &self,
        proposal_id: ProposalId,
        member_id: &MemberId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .votes_db
            .get(&rtxn, &vote_key(proposal_id, member_id))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn votes_for(&self, proposal_id: ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = proposal_key(proposal_id);
        let iter = self.votes_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut votes = Vec::new();
        for entry in iter {
            let (key, bytes) = entry.map_err(LmdbError::from)?;
            if !key.starts_with(&prefix) {
                continue;
            }
            votes.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(votes)
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn apply_vote(&self, vote: &VoteRecord, approval_weight: u64) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let pkey = proposal_key(vote.proposal_id);
        let mut proposal: ProposalRecord = match self
            .proposals_db
            .get(&wtxn, &pkey)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_proposal(bytes)?,
            None => {
                return Err(StoreError::NotFound(format!(
                    "proposal {}",
                    vote.proposal_id
                )))
            }
        };

        let vote_bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut wtxn, &vote_key(vote.proposal_id, &vote.member_id), &vote_bytes)
            .map_err(LmdbError::from)?;

        proposal.approval_weight = approval_weight;
        let proposal_bytes = encode_proposal(&proposal)?;
        self.proposals_db
            .put(&mut wtxn, &pkey, &proposal_bytes)
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zonegov_types::{VoteChoice, ZoneDocument};

    fn open_test_store() -> (tempfile::TempDir, LmdbGovernanceStore) {
        let dir = tempfile::tempdir().unwrap();
        let env = crate::LmdbEnvironment::open(dir.path()).unwrap();
        let store = env.governance_store();
        (dir, store)
    }

    fn member(id: &str, power: u64, active: bool) -> MemberRecord {
        MemberRecord {
            id: MemberId::new(id),
            voting_power: power,
            active,
            updated_at: Timestamp::new(1000),
        }
    }

    fn proposal(id: u64) -> ProposalRecord {
        ProposalRecord {
            id: ProposalId::new(id),
            payload: ZoneDocument {
                kind: ZoneDocument::KIND.to_string(),
                domain: "example.org".to_string(),
                version: 1,
                records: json!({"www": {"A": "203.0.113.7"}}),
            },
            quorum_threshold_percent: 60,
            approval_weight: 0,
            status: ProposalStatus::Pending,
            created_at: Timestamp::new(1000),
            executed_at: None,
            execution_ref: None,
        }
    }

    fn vote(pid: u64, mid: &str, weight: u64, choice: VoteChoice) -> VoteRecord {
        VoteRecord {
            proposal_id: ProposalId::new(pid),
            member_id: MemberId::new(mid),
            weight,
            choice,
            cast_at: Timestamp::new(2000),
        }
    }

    #[test]
    fn put_and_get_member() {
        let (_dir, store) = open_test_store();
        store.put_member(&member("alice", 10, true)).unwrap();

        let got = store.get_member(&MemberId::new("alice")).unwrap().unwrap();
        assert_eq!(got.voting_power, 10);
        assert!(got.active);
        assert!(store.get_member(&MemberId::new("ghost")).unwrap().is_none());
    }

    #[test]
    fn total_active_power_skips_inactive() {
        let (_dir, store) = open_test_store();
        store.put_member(&member("alice", 10, true)).unwrap();
        store.put_member(&member("bob", 20, false)).unwrap();
        store.put_member(&member("carol", 30, true)).unwrap();

        assert_eq!(store.total_active_power().unwrap(), 40);
    }

    #[test]
    fn proposal_ids_are_sequential() {
        let (_dir, store) = open_test_store();
        assert_eq!(store.next_proposal_id().unwrap(), ProposalId::new(1));
        assert_eq!(store.next_proposal_id().unwrap(), ProposalId::new(2));
        assert_eq!(store.next_proposal_id().unwrap(), ProposalId::new(3));
    }

    #[test]
    fn list_proposals_filters_by_status() {
        let (_dir, store) = open_test_store();
        store.put_proposal(&proposal(1)).unwrap();
        store.put_proposal(&proposal(2)).unwrap();
        store
            .mark_executed(
                ProposalId::new(2),
                Timestamp::new(3000),
                &ExecutionRef::new("ref-2"),
            )
            .unwrap();

        assert_eq!(store.list_proposals(ProposalFilter::All).unwrap().len(), 2);
        let pending = store.list_proposals(ProposalFilter::Pending).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, ProposalId::new(1));
        let executed = store.list_proposals(ProposalFilter::Executed).unwrap();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].id, ProposalId::new(2));
    }

    #[test]
    fn apply_vote_upserts_single_row() {
        let (_dir, store) = open_test_store();
        store.put_proposal(&proposal(1)).unwrap();

        store
            .apply_vote(&vote(1, "alice", 10, VoteChoice::Approve), 10)
            .unwrap();
        store
            .apply_vote(&vote(1, "alice", 10, VoteChoice::Reject), 0)
            .unwrap();

        let votes = store.votes_for(ProposalId::new(1)).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice, VoteChoice::Reject);

        let p = store.get_proposal(ProposalId::new(1)).unwrap().unwrap();
        assert_eq!(p.approval_weight, 0);
    }

    #[test]
    fn apply_vote_unknown_proposal_is_not_found() {
        let (_dir, store) = open_test_store();
        let result = store.apply_vote(&vote(9, "alice", 10, VoteChoice::Approve), 10);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn votes_do_not_leak_across_proposals() {
        let (_dir, store) = open_test_store();
        store.put_proposal(&proposal(1)).unwrap();
        store.put_proposal(&proposal(2)).unwrap();

        store
            .apply_vote(&vote(1, "alice", 10, VoteChoice::Approve), 10)
            .unwrap();
        store
            .apply_vote(&vote(2, "bob", 20, VoteChoice::Approve), 20)
            .unwrap();

        let votes = store.votes_for(ProposalId::new(1)).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].member_id, MemberId::new("alice"));
    }

    #[test]
    fn mark_executed_cas_single_winner() {
        let (_dir, store) = open_test_store();
        store.put_proposal(&proposal(1)).unwrap();

        let first = store
            .mark_executed(
                ProposalId::new(1),
                Timestamp::new(3000),
                &ExecutionRef::new("ref-a"),
            )
            .unwrap();
        let second = store
            .mark_executed(
                ProposalId::new(1),
                Timestamp::new(3001),
                &ExecutionRef::new("ref-b"),
            )
            .unwrap();

        assert!(first);
        assert!(!second);

        // The loser's ref must not overwrite the winner's.
        let p = store.get_proposal(ProposalId::new(1)).unwrap().unwrap();
        assert_eq!(p.execution_ref, Some(ExecutionRef::new("ref-a")));
        assert_eq!(p.executed_at, Some(Timestamp::new(3000)));
    }

    #[test]
    fn mark_executed_unknown_proposal_is_not_found() {
        let (_dir, store) = open_test_store();
        let result = store.mark_executed(
            ProposalId::new(7),
            Timestamp::new(3000),
            &ExecutionRef::new("ref"),
        );
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn latest_executed_prefers_newest_execution() {
        let (_dir, store) = open_test_store();
        store.put_proposal(&proposal(1)).unwrap();
        store.put_proposal(&proposal(2)).unwrap();

        assert!(store.latest_executed().unwrap().is_none());

        store
            .mark_executed(
                ProposalId::new(1),
                Timestamp::new(5000),
                &ExecutionRef::new("ref-1"),
            )
            .unwrap();
        store
            .mark_executed(
                ProposalId::new(2),
                Timestamp::new(4000),
                &ExecutionRef::new("ref-2"),
            )
            .unwrap();

        // Proposal 1 executed later even though proposal 2 has a higher id.
        let latest = store.latest_executed().unwrap().unwrap();
        assert_eq!(latest.id, ProposalId::new(1));
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = crate::LmdbEnvironment::open(dir.path()).unwrap();
            let store = env.governance_store();
            store.put_member(&member("alice", 10, true)).unwrap();
            store.put_proposal(&proposal(1)).unwrap();
        }

        let env = crate::LmdbEnvironment::open(dir.path()).unwrap();
        let store = env.governance_store();
        assert!(store.get_member(&MemberId::new("alice")).unwrap().is_some());
        assert!(store.get_proposal(ProposalId::new(1)).unwrap().is_some());
        // The id counter picks up where it left off only if it was bumped;
        // a fresh counter still never collides with stored rows.
        assert!(store.next_proposal_id().unwrap().as_u64() >= 1);
    }
}

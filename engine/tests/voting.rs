//! Moved from src/voting.rs (see tests/proposals.rs for rationale).

mod tests {
    use serde_json::json;
    use std::sync::Arc;
    use zonegov_engine::{GovernanceEngine, GovernanceError};
    use zonegov_nullables::{NullGovernanceStore, NullPublicationSink};
    use zonegov_types::{MemberId, ProposalId, VoteChoice};

    fn test_engine() -> GovernanceEngine {
        let store = Arc::new(NullGovernanceStore::new());
        let sink = Arc::new(NullPublicationSink::new());
        GovernanceEngine::new(store, sink, "example.org")
    }

    fn proposal(engine: &GovernanceEngine) -> ProposalId {
        engine
            .create_proposal(
                json!({
                    "kind": "dns-zone",
                    "domain": "example.org",
                    "records": {"www": {"A": "203.0.113.7"}},
                }),
                None,
            )
            .unwrap()
            .id
    }

    fn seed_members(engine: &GovernanceEngine, powers: &[(&str, u64)]) {
        for (name, power) in powers {
            engine
                .upsert_member(&MemberId::new(*name), *power, true)
                .unwrap();
        }
    }

    #[test]
    fn approve_votes_accumulate_weight() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10), ("bob", 20)]);
        let pid = proposal(&engine);

        let t1 = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        assert_eq!(t1.approval_weight, 10);

        let t2 = engine
            .cast_vote(pid, &MemberId::new("bob"), VoteChoice::Approve)
            .unwrap();
        assert_eq!(t2.approval_weight, 30);
    }

    #[test]
    fn reject_votes_contribute_nothing() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10)]);
        let pid = proposal(&engine);

        let tally = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Reject)
            .unwrap();
        assert_eq!(tally.approval_weight, 0);
        assert_eq!(engine.votes(pid).unwrap().len(), 1);
    }

    #[test]
    fn revote_replaces_prior_ballot() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10), ("bob", 20)]);
        let pid = proposal(&engine);

        engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        engine
            .cast_vote(pid, &MemberId::new("bob"), VoteChoice::Approve)
            .unwrap();

        // Alice switches sides: her weight must leave the tally entirely.
        let tally = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Reject)
            .unwrap();
        assert_eq!(tally.approval_weight, 20);
        assert_eq!(engine.votes(pid).unwrap().len(), 2);

        // And back again.
        let tally = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        assert_eq!(tally.approval_weight, 30);
        assert_eq!(engine.votes(pid).unwrap().len(), 2);
    }

    #[test]
    fn weight_is_snapshotted_at_cast_time() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10)]);
        let pid = proposal(&engine);

        engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();

        // Power change after the vote does not move the tally...
        engine
            .upsert_member(&MemberId::new("alice"), 99, true)
            .unwrap();
        let p = engine.get_proposal(pid).unwrap().unwrap();
        assert_eq!(p.approval_weight, 10);

        // ...until alice re-votes with her new power.
        let tally = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        assert_eq!(tally.approval_weight, 99);
    }

    #[test]
    fn inactive_member_vote_is_audit_only() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10)]);
        engine
            .upsert_member(&MemberId::new("ghost"), 50, false)
            .unwrap();
        let pid = proposal(&engine);

        let tally = engine
            .cast_vote(pid, &MemberId::new("ghost"), VoteChoice::Approve)
            .unwrap();
        assert_eq!(tally.approval_weight, 0);
        assert_eq!(engine.votes(pid).unwrap().len(), 1);
    }

    #[test]
    fn deactivation_drops_weight_without_revote() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10), ("bob", 20)]);
        let pid = proposal(&engine);

        engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        engine
            .cast_vote(pid, &MemberId::new("bob"), VoteChoice::Approve)
            .unwrap();

        engine
            .upsert_member(&MemberId::new("bob"), 20, false)
            .unwrap();

        let p = engine.get_proposal(pid).unwrap().unwrap();
        assert_eq!(p.approval_weight, 10);

        // Reactivation restores the snapshotted weight.
        engine
            .upsert_member(&MemberId::new("bob"), 20, true)
            .unwrap();
        let p = engine.get_proposal(pid).unwrap().unwrap();
        assert_eq!(p.approval_weight, 30);
    }

    #[test]
    fn unknown_member_rejected() {
        let engine = test_engine();
        let pid = proposal(&engine);
        let result = engine.cast_vote(pid, &MemberId::new("nobody"), VoteChoice::Approve);
        assert!(matches!(result, Err(GovernanceError::Validation(_))));
    }

    #[test]
    fn unknown_proposal_rejected() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 10)]);
        let result = engine.cast_vote(
            ProposalId::new(404),
            &MemberId::new("alice"),
            VoteChoice::Approve,
        );
        assert!(matches!(result, Err(GovernanceError::Validation(_))));
    }

    #[test]
    fn tally_reports_executability() {
        let engine = test_engine();
        seed_members(&engine, &[("alice", 60), ("bob", 40)]);
        let pid = proposal(&engine);

        let tally = engine
            .cast_vote(pid, &MemberId::new("bob"), VoteChoice::Approve)
            .unwrap();
        assert!(!tally.executable);

        let tally = engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        assert!(tally.executable);
        assert_eq!(tally.total_active_power, 100);
    }
}

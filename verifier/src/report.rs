//! Drift reports. Ephemeral — reported to the caller, never persisted.

use serde::Serialize;
use serde_json::Value;
use zonegov_types::{ProposalId, Timestamp};

/// One differing path between the executed payload and the live state.
/// A path present on only one side reports `null` for the missing side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DriftReport {
    /// The executed proposal the live state was checked against.
    pub proposal_id: ProposalId,
    pub mismatched_paths: Vec<Mismatch>,
    pub checked_at: Timestamp,
}

/// Outcome of one verification pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum VerifyOutcome {
    /// Nothing has executed yet — a status, not an error.
    NoExecutedProposal,
    /// Live state matches the last executed payload.
    Healthy { proposal_id: ProposalId },
    /// At least one path differs.
    Drift(DriftReport),
}

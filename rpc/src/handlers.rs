//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zonegov_store::ProposalRecord;
use zonegov_verifier::{Mismatch, VerifyOutcome};

// ── Propose ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProposeRequest {
    pub payload: Value,
    pub quorum_threshold_percent: Option<u8>,
}

#[derive(Serialize)]
pub struct ProposeResponse {
    pub proposal_id: u64,
    pub status: String,
}

// ── Vote ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VoteRequest {
    pub proposal_id: u64,
    pub member_id: String,
    pub choice: String,
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub proposal_id: u64,
    pub approval_weight: u64,
    pub quorum_percent: u8,
    pub total_active_power: u64,
    pub executable: bool,
}

// ── Execute ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExecuteRequest {
    pub proposal_id: u64,
}

#[derive(Serialize)]
pub struct ExecuteResponse {
    pub proposal_id: u64,
    pub status: String,
    pub execution_ref: String,
    /// True when this call lost the race to a concurrent execution —
    /// success-equivalent for idempotent callers.
    pub already_executed: bool,
}

// ── Verify ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct VerifyParams {
    /// Overrides the configured canonical live-state location.
    pub source_url: Option<String>,
}

#[derive(Serialize)]
pub struct MismatchDto {
    pub path: String,
    pub expected: Value,
    pub actual: Value,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatches: Option<Vec<MismatchDto>>,
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        match outcome {
            VerifyOutcome::NoExecutedProposal => VerifyResponse {
                status: "no_executed_proposal",
                proposal_id: None,
                checked_at: None,
                mismatches: None,
            },
            VerifyOutcome::Healthy { proposal_id } => VerifyResponse {
                status: "healthy",
                proposal_id: Some(proposal_id.as_u64()),
                checked_at: None,
                mismatches: None,
            },
            VerifyOutcome::Drift(report) => VerifyResponse {
                status: "drift",
                proposal_id: Some(report.proposal_id.as_u64()),
                checked_at: Some(report.checked_at.as_secs()),
                mismatches: Some(report.mismatched_paths.into_iter().map(Into::into).collect()),
            },
        }
    }
}

impl From<Mismatch> for MismatchDto {
    fn from(m: Mismatch) -> Self {
        Self {
            path: m.path,
            expected: m.expected,
            actual: m.actual,
        }
    }
}

// ── Proposal queries ─────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ListProposalsParams {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ProposalSummary {
    pub proposal_id: u64,
    pub status: String,
    pub quorum_threshold_percent: u8,
    pub approval_weight: u64,
    pub created_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_ref: Option<String>,
}

#[derive(Serialize)]
pub struct ProposalDetail {
    #[serde(flatten)]
    pub summary: ProposalSummary,
    pub payload: Value,
}

impl From<&ProposalRecord> for ProposalSummary {
    fn from(record: &ProposalRecord) -> Self {
        Self {
            proposal_id: record.id.as_u64(),
            status: record.status.to_string(),
            quorum_threshold_percent: record.quorum_threshold_percent,
            approval_weight: record.approval_weight,
            created_at: record.created_at.as_secs(),
            executed_at: record.executed_at.map(|t| t.as_secs()),
            execution_ref: record.execution_ref.as_ref().map(|r| r.as_str().to_string()),
        }
    }
}

impl From<&ProposalRecord> for ProposalDetail {
    fn from(record: &ProposalRecord) -> Self {
        Self {
            summary: record.into(),
            payload: record.payload.to_value(),
        }
    }
}

// ── Republish ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RepublishResponse {
    pub proposal_id: u64,
    pub execution_ref: String,
    pub executed_at: u64,
}

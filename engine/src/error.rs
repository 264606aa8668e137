use thiserror::Error;
use zonegov_store::StoreError;
use zonegov_types::{PayloadError, ProposalId};

#[derive(Debug, Error)]
pub enum GovernanceError {
    /// Malformed payload, out-of-range threshold, unknown member/proposal.
    /// Terminal for the request; never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A vote was cast against a non-Pending proposal.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Execute attempted before the threshold was reached. Safe to retry
    /// once more votes arrive.
    #[error(
        "quorum not met: approval weight {have} of {total} total active power is below {need_percent}%"
    )]
    QuorumNotMet {
        have: u64,
        total: u64,
        need_percent: u8,
    },

    /// Execute raced with a concurrent successful execution. Callers must
    /// treat this as success.
    #[error("proposal {0} is already executed")]
    AlreadyExecuted(ProposalId),

    /// An external collaborator (power source, publication sink) was
    /// unreachable. Retried by the calling scheduler, never inside the
    /// governance transaction.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<PayloadError> for GovernanceError {
    fn from(e: PayloadError) -> Self {
        GovernanceError::Validation(e.to_string())
    }
}

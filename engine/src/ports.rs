//! Outbound ports — the narrow interfaces behind which the external
//! collaborators live. Implementations are out of the governance core;
//! the nullables crate provides deterministic test doubles.

use async_trait::async_trait;
use thiserror::Error;
use zonegov_types::MemberId;

use crate::execution::ExecutionEvent;

/// An external collaborator was unreachable or refused the request.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UpstreamError(pub String);

/// Receives the canonical execution event after a proposal executes.
///
/// A failure here never rolls back governance state: the proposal stays
/// Executed and the caller re-publishes with the same execution ref.
#[async_trait]
pub trait PublicationSink: Send + Sync {
    async fn publish(&self, event: &ExecutionEvent) -> Result<(), UpstreamError>;
}

/// One member as reported by the external identity system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: MemberId,
    pub voting_power: u64,
    pub active: bool,
}

/// The source of truth for member voting power, polled by the registry
/// sync job.
#[async_trait]
pub trait MemberPowerSource: Send + Sync {
    async fn fetch_roster(&self) -> Result<Vec<RosterEntry>, UpstreamError>;
}

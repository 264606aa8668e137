//! Governance core for zonegov.
//!
//! The proposal → vote → quorum → execute lifecycle over a weighted member
//! registry. All state lives behind the `zonegov-store` traits; external
//! collaborators (the publication sink and the member-power source) sit
//! behind the port traits in [`ports`].
//!
//! Concurrency model: every mutating operation serialises through a single
//! governance lock owned by [`GovernanceEngine`], and the storage layer
//! additionally makes the Pending→Executed transition a compare-and-swap.
//! The lock is never held across an await — publication to the sink happens
//! strictly after the execution transition has committed.

pub mod engine;
pub mod error;
pub mod execution;
pub mod ports;
pub mod proposals;
pub mod quorum;
pub mod registry;
pub mod sync;
pub mod voting;

pub use engine::{GovernanceEngine, DEFAULT_QUORUM_PERCENT};
pub use error::GovernanceError;
pub use execution::ExecutionEvent;
pub use ports::{MemberPowerSource, PublicationSink, RosterEntry, UpstreamError};
pub use registry::MAX_VOTING_POWER;
pub use sync::RegistrySync;
pub use voting::VoteTally;

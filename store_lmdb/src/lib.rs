//! LMDB storage backend for zonegov.
//!
//! Implements the storage traits from `zonegov-store` using the `heed` LMDB
//! bindings. One environment holds one database per table (members,
//! proposals, votes, meta); records are bincode-encoded. The compound
//! operations (`apply_vote`, `mark_executed`) each run inside a single LMDB
//! write transaction, which is what makes them atomic under concurrency.

pub mod environment;
pub mod error;
pub mod governance;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;

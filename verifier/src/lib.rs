//! Drift verification for zonegov.
//!
//! Compares the most recently executed proposal's payload against the live
//! externally published state and reports per-path differences. Strictly
//! read-only: it takes no locks and never mutates governance state, so it
//! can run on any schedule concurrently with voting and execution.

pub mod diff;
pub mod drift;
pub mod error;
pub mod fetcher;
pub mod report;

pub use diff::diff_documents;
pub use drift::DriftVerifier;
pub use error::VerifyError;
pub use fetcher::{HttpStateFetcher, LiveStateFetcher};
pub use report::{DriftReport, Mismatch, VerifyOutcome};

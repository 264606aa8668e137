//! Fundamental types for the zonegov governance engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, timestamps, vote and proposal state enums, and the
//! governed zone document with its schema validation.

pub mod id;
pub mod payload;
pub mod state;
pub mod time;

pub use id::{ExecutionRef, MemberId, ProposalId};
pub use payload::{PayloadError, ZoneDocument};
pub use state::{ProposalStatus, VoteChoice};
pub use time::{Clock, SystemClock, Timestamp};

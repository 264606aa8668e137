//! HTTP API for the zonegov engine.
//!
//! Binds the four governance operations (propose, vote, execute, verify)
//! plus read-only proposal queries, a health probe, and a Prometheus
//! metrics endpoint onto an axum router.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::ApiMetrics;
pub use server::{AppState, RpcServer};

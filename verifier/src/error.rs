use thiserror::Error;
use zonegov_store::StoreError;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The live-state fetcher was unreachable. Retried by the calling
    /// scheduler; surfaced as degraded health, not a crash.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

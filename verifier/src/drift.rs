//! The drift verifier.

use std::sync::Arc;

use zonegov_store::{ProposalStore, SharedStore};
use zonegov_types::{Clock, SystemClock};

use crate::diff::diff_documents;
use crate::error::VerifyError;
use crate::fetcher::LiveStateFetcher;
use crate::report::{DriftReport, VerifyOutcome};

/// Compares the last executed proposal's payload against the live state.
pub struct DriftVerifier {
    store: SharedStore,
    fetcher: Arc<dyn LiveStateFetcher>,
    clock: Arc<dyn Clock>,
}

impl DriftVerifier {
    pub fn new(store: SharedStore, fetcher: Arc<dyn LiveStateFetcher>) -> Self {
        Self {
            store,
            fetcher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the system clock, for deterministic tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// One verification pass against the configured fetcher.
    pub async fn verify(&self) -> Result<VerifyOutcome, VerifyError> {
        self.verify_with(self.fetcher.as_ref()).await
    }

    /// One verification pass against an explicit source, for callers that
    /// override the canonical live-state location.
    ///
    /// Reads the latest executed proposal, fetches the live state, and
    /// diffs the two. Never mutates anything and takes no governance lock.
    pub async fn verify_with(
        &self,
        fetcher: &dyn LiveStateFetcher,
    ) -> Result<VerifyOutcome, VerifyError> {
        let Some(proposal) = self.store.latest_executed()? else {
            return Ok(VerifyOutcome::NoExecutedProposal);
        };

        let live = fetcher
            .fetch_live()
            .await
            .map_err(|e| VerifyError::Upstream(e.to_string()))?;

        let expected = proposal.payload.to_value();
        let mismatched_paths = diff_documents(&expected, &live);

        if mismatched_paths.is_empty() {
            tracing::debug!(proposal = %proposal.id, "live state matches executed payload");
            Ok(VerifyOutcome::Healthy {
                proposal_id: proposal.id,
            })
        } else {
            tracing::warn!(
                proposal = %proposal.id,
                mismatches = mismatched_paths.len(),
                "drift detected between live state and executed payload"
            );
            Ok(VerifyOutcome::Drift(DriftReport {
                proposal_id: proposal.id,
                mismatched_paths,
                checked_at: self.clock.now(),
            }))
        }
    }
}

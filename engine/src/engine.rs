//! The governance engine — owns the store, the publication sink, and the
//! governance lock. Method groups live in the component modules
//! (`registry`, `proposals`, `voting`, `execution`).

use std::sync::{Arc, Mutex, MutexGuard};

use zonegov_store::SharedStore;
use zonegov_types::{Clock, SystemClock};

use crate::ports::PublicationSink;

/// Quorum threshold applied when a proposal does not specify one.
pub const DEFAULT_QUORUM_PERCENT: u8 = 60;

/// The quorum-gated governance engine for one governed domain.
///
/// Cheap to share: wrap in an `Arc` and hand clones to the RPC handlers and
/// the background loops.
pub struct GovernanceEngine {
    pub(crate) store: SharedStore,
    pub(crate) sink: Arc<dyn PublicationSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) governed_domain: String,
    pub(crate) default_quorum_percent: u8,
    /// Serialises every governance mutation — the coarse equivalent of
    /// row-level locking on the proposal row. Never held across an await.
    pub(crate) write_lock: Mutex<()>,
}

impl GovernanceEngine {
    pub fn new(
        store: SharedStore,
        sink: Arc<dyn PublicationSink>,
        governed_domain: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sink,
            clock: Arc::new(SystemClock),
            governed_domain: governed_domain.into(),
            default_quorum_percent: DEFAULT_QUORUM_PERCENT,
            write_lock: Mutex::new(()),
        }
    }

    /// Replace the system clock, for deterministic tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the default quorum threshold.
    ///
    /// # Panics
    /// Panics if `percent` is outside `[1, 100]`; this is configuration,
    /// not request input.
    pub fn with_default_quorum(mut self, percent: u8) -> Self {
        assert!(
            (1..=100).contains(&percent),
            "default quorum threshold must be within [1, 100]"
        );
        self.default_quorum_percent = percent;
        self
    }

    pub fn governed_domain(&self) -> &str {
        &self.governed_domain
    }

    pub fn default_quorum_percent(&self) -> u8 {
        self.default_quorum_percent
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().expect("governance lock poisoned")
    }
}

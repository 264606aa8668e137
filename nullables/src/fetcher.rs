//! Nullable live-state fetcher — serves a canned document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use zonegov_engine::UpstreamError;
use zonegov_verifier::LiveStateFetcher;

pub struct NullStateFetcher {
    live: Mutex<Value>,
    failing: AtomicBool,
}

impl NullStateFetcher {
    pub fn new(live: Value) -> Self {
        Self {
            live: Mutex::new(live),
            failing: AtomicBool::new(false),
        }
    }

    /// Replace the document the fetcher serves.
    pub fn set_live(&self, live: Value) {
        *self.live.lock().unwrap() = live;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LiveStateFetcher for NullStateFetcher {
    async fn fetch_live(&self) -> Result<Value, UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError("live state endpoint unavailable".to_string()));
        }
        Ok(self.live.lock().unwrap().clone())
    }
}

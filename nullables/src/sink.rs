//! Nullable publication sink — records execution events, with injectable
//! failure for retry-path testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use zonegov_engine::{ExecutionEvent, PublicationSink, UpstreamError};

pub struct NullPublicationSink {
    events: Mutex<Vec<ExecutionEvent>>,
    failing: AtomicBool,
}

impl NullPublicationSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Everything published so far, in order.
    pub fn events(&self) -> Vec<ExecutionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// While failing, publishes are rejected and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for NullPublicationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublicationSink for NullPublicationSink {
    async fn publish(&self, event: &ExecutionEvent) -> Result<(), UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError("publication sink unavailable".to_string()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

//! Nullable member-power source — scripted rosters for the sync job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use zonegov_engine::{MemberPowerSource, RosterEntry, UpstreamError};

pub struct NullPowerSource {
    roster: Mutex<Vec<RosterEntry>>,
    failing: AtomicBool,
}

impl NullPowerSource {
    pub fn new(roster: Vec<RosterEntry>) -> Self {
        Self {
            roster: Mutex::new(roster),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_roster(&self, roster: Vec<RosterEntry>) {
        *self.roster.lock().unwrap() = roster;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MemberPowerSource for NullPowerSource {
    async fn fetch_roster(&self) -> Result<Vec<RosterEntry>, UpstreamError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UpstreamError("member power source unavailable".to_string()));
        }
        Ok(self.roster.lock().unwrap().clone())
    }
}

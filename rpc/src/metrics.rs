//! Prometheus metrics for the governance API.
//!
//! The [`ApiMetrics`] struct owns a dedicated [`Registry`] that the
//! `/metrics` endpoint encodes into the Prometheus text exposition format.
//! The daemon's background loops share the same instance for the drift and
//! sync counters.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, IntCounter,
    IntGauge, Opts, Registry, TextEncoder,
};

pub struct ApiMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Total proposals accepted through the API.
    pub proposals_created: IntCounter,
    /// Total ballots recorded (including re-votes).
    pub votes_cast: IntCounter,
    /// Total successful Pending→Executed transitions.
    pub proposals_executed: IntCounter,
    /// Publications that failed after the execution committed.
    pub publication_failures: IntCounter,
    /// Drift verification passes.
    pub drift_checks: IntCounter,
    /// Registry sync polls that failed upstream.
    pub sync_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Mismatched paths found by the most recent drift check.
    pub last_drift_mismatches: IntGauge,
    /// Total active voting power as of the last registry sync.
    pub total_active_power: IntGauge,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let proposals_created = register_int_counter_with_registry!(
            Opts::new("zonegov_proposals_created_total", "Total proposals created"),
            registry
        )
        .expect("failed to register proposals_created counter");

        let votes_cast = register_int_counter_with_registry!(
            Opts::new("zonegov_votes_cast_total", "Total ballots recorded"),
            registry
        )
        .expect("failed to register votes_cast counter");

        let proposals_executed = register_int_counter_with_registry!(
            Opts::new(
                "zonegov_proposals_executed_total",
                "Total proposals executed"
            ),
            registry
        )
        .expect("failed to register proposals_executed counter");

        let publication_failures = register_int_counter_with_registry!(
            Opts::new(
                "zonegov_publication_failures_total",
                "Publications that failed after execution committed"
            ),
            registry
        )
        .expect("failed to register publication_failures counter");

        let drift_checks = register_int_counter_with_registry!(
            Opts::new("zonegov_drift_checks_total", "Drift verification passes"),
            registry
        )
        .expect("failed to register drift_checks counter");

        let sync_failures = register_int_counter_with_registry!(
            Opts::new(
                "zonegov_sync_failures_total",
                "Registry sync polls that failed upstream"
            ),
            registry
        )
        .expect("failed to register sync_failures counter");

        let last_drift_mismatches = register_int_gauge_with_registry!(
            Opts::new(
                "zonegov_last_drift_mismatches",
                "Mismatched paths in the most recent drift check"
            ),
            registry
        )
        .expect("failed to register last_drift_mismatches gauge");

        let total_active_power = register_int_gauge_with_registry!(
            Opts::new(
                "zonegov_total_active_power",
                "Total active voting power at last sync"
            ),
            registry
        )
        .expect("failed to register total_active_power gauge");

        Self {
            registry,
            proposals_created,
            votes_cast,
            proposals_executed,
            publication_failures,
            drift_checks,
            sync_failures,
            last_drift_mismatches,
            total_active_power,
        }
    }

    /// Encode every registered metric in the Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("failed to encode metrics: {e}");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

//! zonegov daemon — wires the LMDB store, governance engine, drift
//! verifier, and HTTP API together and runs the background loops.

mod config;
mod power;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info, warn};

use zonegov_engine::{GovernanceEngine, PublicationSink, RegistrySync};
use zonegov_rpc::{ApiMetrics, AppState, RpcServer};
use zonegov_store::GovernanceStore;
use zonegov_store_lmdb::LmdbEnvironment;
use zonegov_verifier::{DriftVerifier, HttpStateFetcher, VerifyOutcome};

use crate::config::DaemonConfig;
use crate::power::HttpPowerSource;
use crate::sink::{HttpPublicationSink, LogPublicationSink};

#[derive(Parser)]
#[command(
    name = "zonegovd",
    about = "Quorum-gated governance daemon for DNS zone configuration"
)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "ZONEGOV_CONFIG")]
    config: Option<PathBuf>,

    /// The governed domain.
    #[arg(long, env = "ZONEGOV_DOMAIN")]
    domain: Option<String>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "ZONEGOV_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Port for the governance API.
    #[arg(long, env = "ZONEGOV_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Canonical location of the live published state.
    #[arg(long, env = "ZONEGOV_LIVE_STATE_URL")]
    live_state_url: Option<String>,

    /// Member-power source endpoint; registry sync is disabled without it.
    #[arg(long, env = "ZONEGOV_POWER_SOURCE_URL")]
    power_source_url: Option<String>,

    /// Publication endpoint for execution events; logged when unset.
    #[arg(long, env = "ZONEGOV_PUBLISH_URL")]
    publish_url: Option<String>,

    /// Default quorum threshold percent for proposals that omit one.
    #[arg(long, env = "ZONEGOV_DEFAULT_QUORUM")]
    default_quorum: Option<u8>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    zonegov_utils::init_tracing();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let cfg = DaemonConfig::from_toml_file(path)?;
            info!("loaded config from {}", path.display());
            cfg
        }
        None => DaemonConfig::default(),
    };
    if let Some(domain) = cli.domain {
        config.governed_domain = domain;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(port) = cli.rpc_port {
        config.rpc_port = port;
    }
    if let Some(url) = cli.live_state_url {
        config.live_state_url = url;
    }
    if let Some(url) = cli.power_source_url {
        config.power_source_url = Some(url);
    }
    if let Some(url) = cli.publish_url {
        config.publish_url = Some(url);
    }
    if let Some(quorum) = cli.default_quorum {
        config.default_quorum_percent = quorum;
    }

    info!(
        domain = %config.governed_domain,
        data_dir = %config.data_dir.display(),
        rpc_port = config.rpc_port,
        sync = config.power_source_url.is_some(),
        "starting zonegov daemon"
    );

    let env = LmdbEnvironment::open(&config.data_dir)?;
    let store: Arc<dyn GovernanceStore> = Arc::new(env.governance_store());

    let publication: Arc<dyn PublicationSink> = match &config.publish_url {
        Some(url) => Arc::new(HttpPublicationSink::new(url.clone())),
        None => Arc::new(LogPublicationSink),
    };

    let engine = Arc::new(
        GovernanceEngine::new(store.clone(), publication, config.governed_domain.clone())
            .with_default_quorum(config.default_quorum_percent),
    );
    let verifier = Arc::new(DriftVerifier::new(
        store.clone(),
        Arc::new(HttpStateFetcher::new(config.live_state_url.clone())),
    ));
    let metrics = Arc::new(ApiMetrics::new());

    if let Some(url) = config.power_source_url.clone() {
        spawn_sync_loop(
            RegistrySync::new(engine.clone(), Arc::new(HttpPowerSource::new(url))),
            engine.clone(),
            metrics.clone(),
            config.sync_interval_secs,
        );
    }
    spawn_verify_loop(verifier.clone(), metrics.clone(), config.verify_interval_secs);

    let state = Arc::new(AppState {
        engine,
        verifier,
        metrics,
    });
    RpcServer::new(config.rpc_port, state).start().await?;
    Ok(())
}

/// Poll the member-power source on a fixed interval, with exponential
/// backoff (capped at the interval) while the source is down.
fn spawn_sync_loop(
    sync: RegistrySync,
    engine: Arc<GovernanceEngine>,
    metrics: Arc<ApiMetrics>,
    interval_secs: u64,
) {
    tokio::spawn(async move {
        let interval = interval_secs.max(1);
        let mut consecutive_failures = 0u32;
        loop {
            let delay = match sync.run_once().await {
                Ok(count) => {
                    consecutive_failures = 0;
                    if let Ok(total) = engine.total_active_voting_power() {
                        metrics.total_active_power.set(total.min(i64::MAX as u64) as i64);
                    }
                    debug!(members = count, "roster synced");
                    interval
                }
                Err(e) => {
                    consecutive_failures += 1;
                    metrics.sync_failures.inc();
                    warn!(error = %e, "registry sync failed; backing off");
                    (1u64 << consecutive_failures.min(10)).min(interval)
                }
            };
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    });
}

/// Run the drift verifier on a fixed interval. Verification is read-only,
/// so failures only log and never touch governance state.
fn spawn_verify_loop(verifier: Arc<DriftVerifier>, metrics: Arc<ApiMetrics>, interval_secs: u64) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(interval_secs.max(1));
        loop {
            tokio::time::sleep(interval).await;
            match verifier.verify().await {
                Ok(outcome) => {
                    metrics.drift_checks.inc();
                    match outcome {
                        VerifyOutcome::Drift(report) => {
                            metrics
                                .last_drift_mismatches
                                .set(report.mismatched_paths.len() as i64);
                            warn!(
                                proposal = %report.proposal_id,
                                mismatches = report.mismatched_paths.len(),
                                "drift detected between live state and executed payload"
                            );
                        }
                        VerifyOutcome::Healthy { proposal_id } => {
                            metrics.last_drift_mismatches.set(0);
                            debug!(proposal = %proposal_id, "live state healthy");
                        }
                        VerifyOutcome::NoExecutedProposal => {
                            debug!("nothing executed yet; skipping drift check");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "drift verification failed"),
            }
        }
    });
}

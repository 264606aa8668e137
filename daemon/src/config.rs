//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the zonegov daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`] or
/// built programmatically. CLI flags and environment variables override
/// file values (see `main.rs`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// The domain whose configuration this engine governs. Proposal
    /// payloads pinned to any other domain are rejected.
    #[serde(default = "default_governed_domain")]
    pub governed_domain: String,

    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Port for the governance API.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Quorum threshold applied when a proposal does not specify one.
    #[serde(default = "default_quorum_percent")]
    pub default_quorum_percent: u8,

    /// Canonical location of the live published state, polled by the
    /// drift verifier.
    #[serde(default = "default_live_state_url")]
    pub live_state_url: String,

    /// Member-power source endpoint for the registry sync job. Sync is
    /// disabled when unset.
    #[serde(default)]
    pub power_source_url: Option<String>,

    /// Publication endpoint for execution events. When unset, events go to
    /// the log pipeline instead.
    #[serde(default)]
    pub publish_url: Option<String>,

    /// Seconds between registry sync polls.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Seconds between drift verification passes.
    #[serde(default = "default_verify_interval_secs")]
    pub verify_interval_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_governed_domain() -> String {
    "example.org".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./zonegov_data")
}

fn default_rpc_port() -> u16 {
    7070
}

fn default_quorum_percent() -> u8 {
    60
}

fn default_live_state_url() -> String {
    "http://127.0.0.1:8080/zone.json".to_string()
}

fn default_sync_interval_secs() -> u64 {
    60
}

fn default_verify_interval_secs() -> u64 {
    300
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).map_err(|e| anyhow::anyhow!("parse config: {e}"))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("DaemonConfig is always serializable to TOML")
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            governed_domain: default_governed_domain(),
            data_dir: default_data_dir(),
            rpc_port: default_rpc_port(),
            default_quorum_percent: default_quorum_percent(),
            live_state_url: default_live_state_url(),
            power_source_url: None,
            publish_url: None,
            sync_interval_secs: default_sync_interval_secs(),
            verify_interval_secs: default_verify_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.rpc_port, config.rpc_port);
        assert_eq!(parsed.governed_domain, config.governed_domain);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7070);
        assert_eq!(config.default_quorum_percent, 60);
        assert!(config.power_source_url.is_none());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            governed_domain = "zones.example.net"
            rpc_port = 9999
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.governed_domain, "zones.example.net");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.sync_interval_secs, 60); // default
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = DaemonConfig::from_toml_file(std::path::Path::new("/nonexistent/zonegov.toml"));
        assert!(result.is_err());
    }
}

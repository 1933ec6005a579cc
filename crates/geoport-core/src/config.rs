//! Configuration model.
//!
//! Every section has serde defaults so a partial (or missing) config file
//! still yields a complete configuration.

use crate::history::MAX_HISTORY_ENTRIES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "https://api.geoport.example.com";
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 10;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct GeoportConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub mechanism: MechanismConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

/// Remote override service settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub base_url: String,
    #[serde(default = "default_service_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            timeout_secs: default_service_timeout_secs(),
            app_version: default_app_version(),
        }
    }
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_service_timeout_secs() -> u64 {
    DEFAULT_SERVICE_TIMEOUT_SECS
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Simulated latencies of the in-process mechanisms, in milliseconds.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MechanismConfig {
    #[serde(default = "default_privileged_apply_delay_ms")]
    pub privileged_apply_delay_ms: u64,
    #[serde(default = "default_privileged_revert_delay_ms")]
    pub privileged_revert_delay_ms: u64,
    #[serde(default = "default_simulation_apply_delay_ms")]
    pub simulation_apply_delay_ms: u64,
    #[serde(default = "default_simulation_revert_delay_ms")]
    pub simulation_revert_delay_ms: u64,
}

impl MechanismConfig {
    /// All delays zero; used by tests and the CLI's `--no-delay`.
    pub fn immediate() -> Self {
        Self {
            privileged_apply_delay_ms: 0,
            privileged_revert_delay_ms: 0,
            simulation_apply_delay_ms: 0,
            simulation_revert_delay_ms: 0,
        }
    }
}

impl Default for MechanismConfig {
    fn default() -> Self {
        Self {
            privileged_apply_delay_ms: default_privileged_apply_delay_ms(),
            privileged_revert_delay_ms: default_privileged_revert_delay_ms(),
            simulation_apply_delay_ms: default_simulation_apply_delay_ms(),
            simulation_revert_delay_ms: default_simulation_revert_delay_ms(),
        }
    }
}

fn default_privileged_apply_delay_ms() -> u64 {
    1000
}

fn default_privileged_revert_delay_ms() -> u64 {
    500
}

fn default_simulation_apply_delay_ms() -> u64 {
    800
}

fn default_simulation_revert_delay_ms() -> u64 {
    300
}

/// Background reachability checks against the service host.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConnectivityConfig {
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
}

impl HistoryConfig {
    /// The configured limit, never above the hard bound.
    pub fn effective_limit(&self) -> usize {
        self.default_limit.min(MAX_HISTORY_ENTRIES)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    MAX_HISTORY_ENTRIES
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EventsConfig {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

fn default_event_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GeoportConfig =
            serde_json::from_str(r#"{"service": {"timeout_secs": 3}}"#).unwrap();
        assert_eq!(config.service.timeout_secs, 3);
        assert_eq!(config.service.base_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.mechanism.simulation_apply_delay_ms, 800);
        assert_eq!(config.history.default_limit, 50);
    }

    #[test]
    fn test_history_limit_is_clamped() {
        let config = HistoryConfig { default_limit: 500 };
        assert_eq!(config.effective_limit(), MAX_HISTORY_ENTRIES);
    }
}

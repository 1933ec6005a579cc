//! Result types returned by the coordinator.

use chrono::{DateTime, Utc};
use geoport_core::error::GeoportError;
use geoport_core::mechanism::MechanismKind;
use geoport_core::session::OverrideSession;
use serde::{Deserialize, Serialize};

/// Accepted override, returned by `set_override`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideReceipt {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub mechanism: MechanismKind,
    /// Place name recorded in history.
    pub name: String,
    /// Secondary failure that did not fail the override (history persistence).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<GeoportError>,
}

/// Result of `stop_override`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOutcome {
    /// True when the device is no longer overriding as a result of this call
    /// (including when there was nothing to stop).
    pub stopped: bool,
    pub message: String,
    /// The session that was stopped, marked inactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<OverrideSession>,
}

impl StopOutcome {
    pub fn nothing_to_stop() -> Self {
        Self {
            stopped: true,
            message: "No active location override".to_string(),
            session: None,
        }
    }

    pub fn stopped(session: OverrideSession) -> Self {
        Self {
            stopped: true,
            message: "Location override stopped".to_string(),
            session: Some(session),
        }
    }

    /// A newer override replaced the session while it was being reverted.
    pub fn superseded() -> Self {
        Self {
            stopped: false,
            message: "A newer location override replaced the session being stopped".to_string(),
            session: None,
        }
    }

    pub fn was_active(&self) -> bool {
        self.session.is_some()
    }
}

/// Liveness summary of the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    pub active_sessions: usize,
    pub uptime_secs: i64,
    pub timestamp: DateTime<Utc>,
    pub available_mechanisms: Vec<MechanismKind>,
}

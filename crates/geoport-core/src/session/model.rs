use crate::coordinate::Coordinate;
use crate::mechanism::MechanismKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The live record of an override applied to one device.
///
/// Sessions are owned by the [`SessionRegistry`](super::SessionRegistry)
/// and handed out by copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideSession {
    /// Unique per successful `set`; distinguishes a re-set session from the one it replaced.
    pub id: Uuid,
    pub device_id: String,
    pub coordinate: Coordinate,
    pub mechanism: MechanismKind,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_at: Option<DateTime<Utc>>,
}

impl OverrideSession {
    /// Creates an active session stamped with the current time.
    pub fn start(
        device_id: impl Into<String>,
        coordinate: Coordinate,
        mechanism: MechanismKind,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id: device_id.into(),
            coordinate,
            mechanism,
            source: source.into(),
            created_at: Utc::now(),
            active: true,
            stopped_at: None,
        }
    }

    /// Marks the session inactive as of `at`.
    pub fn mark_stopped(&mut self, at: DateTime<Utc>) {
        self.active = false;
        self.stopped_at = Some(at);
    }

    pub fn status(&self) -> OverrideStatus {
        if !self.active {
            return OverrideStatus::inactive();
        }
        OverrideStatus {
            active: true,
            coordinate: Some(self.coordinate),
            source: Some(self.source.clone()),
            timestamp: Some(self.created_at),
            mechanism: Some(self.mechanism),
        }
    }
}

/// Caller-facing view of a device's override state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideStatus {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<MechanismKind>,
}

impl OverrideStatus {
    pub fn inactive() -> Self {
        Self {
            active: false,
            coordinate: None,
            source: None,
            timestamp: None,
            mechanism: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::validate;

    #[test]
    fn test_start_is_active() {
        let session = OverrideSession::start(
            "dev1",
            validate(1.0, 2.0).unwrap(),
            MechanismKind::LocalSimulation,
            "api",
        );
        assert!(session.active);
        assert!(session.stopped_at.is_none());

        let status = session.status();
        assert!(status.active);
        assert_eq!(status.coordinate, Some(validate(1.0, 2.0).unwrap()));
        assert_eq!(status.source.as_deref(), Some("api"));
    }

    #[test]
    fn test_mark_stopped() {
        let mut session = OverrideSession::start(
            "dev1",
            validate(1.0, 2.0).unwrap(),
            MechanismKind::Privileged,
            "api",
        );
        let now = Utc::now();
        session.mark_stopped(now);

        assert!(!session.active);
        assert_eq!(session.stopped_at, Some(now));
        assert_eq!(session.status(), OverrideStatus::inactive());
    }

    #[test]
    fn test_distinct_ids() {
        let coordinate = validate(1.0, 2.0).unwrap();
        let a = OverrideSession::start("dev1", coordinate, MechanismKind::Privileged, "api");
        let b = OverrideSession::start("dev1", coordinate, MechanismKind::Privileged, "api");
        assert_ne!(a.id, b.id);
    }
}

use crate::coordinate::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of entries kept per device.
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Two coordinates closer than this (degrees, both axes) are the same place.
pub const PROXIMITY_THRESHOLD: f64 = 0.0001;

/// One past override in a device's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub coordinate: Coordinate,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl HistoryEntry {
    pub fn new(coordinate: Coordinate, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            coordinate,
            name: name.into(),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    pub fn is_near(&self, coordinate: &Coordinate) -> bool {
        self.coordinate.is_within(coordinate, PROXIMITY_THRESHOLD)
    }
}

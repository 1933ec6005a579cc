//! Override change notifications.
//!
//! Observers (for example a UI layer) subscribe to an [`EventBus`] instead of
//! polling status. Delivery is fire-and-forget: publishing never blocks or
//! fails, and each transition is published at most once.

use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A single override transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverrideEvent {
    /// A device started reporting `coordinate`, or switched to it.
    Changed {
        device_id: String,
        coordinate: Coordinate,
    },
    /// A device stopped overriding.
    Stopped { device_id: String },
}

impl OverrideEvent {
    pub fn device_id(&self) -> &str {
        match self {
            OverrideEvent::Changed { device_id, .. } | OverrideEvent::Stopped { device_id } => {
                device_id
            }
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            OverrideEvent::Changed { coordinate, .. } => Some(*coordinate),
            OverrideEvent::Stopped { .. } => None,
        }
    }
}

/// Broadcast channel for [`OverrideEvent`]s.
///
/// Slow subscribers that fall more than `capacity` events behind lose the
/// oldest events (`RecvError::Lagged`); publishers are never held up.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OverrideEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OverrideEvent> {
        self.sender.subscribe()
    }

    /// Publishes `event`. Returns the number of subscribers it reached.
    pub fn publish(&self, event: OverrideEvent) -> usize {
        // No subscribers is not an error for fire-and-forget delivery.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::validate;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = OverrideEvent::Changed {
            device_id: "dev1".to_string(),
            coordinate: validate(1.0, 2.0).unwrap(),
        };
        assert_eq!(bus.publish(event.clone()), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(
            bus.publish(OverrideEvent::Stopped {
                device_id: "dev1".to_string()
            }),
            0
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(OverrideEvent::Stopped {
            device_id: "dev1".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "stopped");
        assert_eq!(json["device_id"], "dev1");
    }
}

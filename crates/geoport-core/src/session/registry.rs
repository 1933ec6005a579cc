use super::model::OverrideSession;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Process-wide mapping from device id to its active [`OverrideSession`].
///
/// Backed by a sharded concurrent map: an operation locks only the shard
/// holding its device, for a single O(1) access, and never across an await.
/// Per-device operations are linearizable; devices in different shards never
/// contend. Cloning the registry yields another handle to the same map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, OverrideSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces or inserts the session for `device_id`, returning the previous one.
    pub fn upsert(&self, device_id: &str, session: OverrideSession) -> Option<OverrideSession> {
        self.sessions.insert(device_id.to_string(), session)
    }

    /// Returns a copy of the session for `device_id`.
    pub fn get(&self, device_id: &str) -> Option<OverrideSession> {
        self.sessions.get(device_id).map(|entry| entry.value().clone())
    }

    /// Removes the session for `device_id` unconditionally.
    pub fn remove(&self, device_id: &str) -> Option<OverrideSession> {
        self.sessions.remove(device_id).map(|(_, session)| session)
    }

    /// Removes the session for `device_id` only if it is still `session_id`.
    ///
    /// Returns `None` (and leaves the map untouched) when the device has no
    /// session or a newer session has replaced the expected one.
    pub fn remove_if(&self, device_id: &str, session_id: Uuid) -> Option<OverrideSession> {
        self.sessions
            .remove_if(device_id, |_, current| current.id == session_id)
            .map(|(_, session)| session)
    }

    /// Number of devices currently overriding.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::validate;
    use crate::mechanism::MechanismKind;

    fn session(device_id: &str, lat: f64) -> OverrideSession {
        OverrideSession::start(
            device_id,
            validate(lat, 0.0).unwrap(),
            MechanismKind::LocalSimulation,
            "test",
        )
    }

    #[test]
    fn test_upsert_replaces() {
        let registry = SessionRegistry::new();
        assert!(registry.upsert("dev1", session("dev1", 1.0)).is_none());

        let previous = registry.upsert("dev1", session("dev1", 2.0)).unwrap();
        assert_eq!(previous.coordinate.latitude(), 1.0);

        let current = registry.get("dev1").unwrap();
        assert_eq!(current.coordinate.latitude(), 2.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new();
        registry.upsert("dev1", session("dev1", 1.0));

        assert!(registry.remove("dev1").is_some());
        assert!(registry.remove("dev1").is_none());
        assert!(registry.get("dev1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_if_ignores_replaced_session() {
        let registry = SessionRegistry::new();
        let first = session("dev1", 1.0);
        let first_id = first.id;
        registry.upsert("dev1", first);

        let second = session("dev1", 2.0);
        let second_id = second.id;
        registry.upsert("dev1", second);

        assert!(registry.remove_if("dev1", first_id).is_none());
        assert_eq!(registry.get("dev1").unwrap().id, second_id);

        assert!(registry.remove_if("dev1", second_id).is_some());
        assert!(registry.get("dev1").is_none());
        assert!(registry.remove_if("dev1", second_id).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_devices_are_independent() {
        let registry = SessionRegistry::new();
        let mut handles = Vec::new();

        for i in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let device = format!("dev{}", i);
                for step in 0..10 {
                    registry.upsert(&device, session(&device, (i * 10 + step) as f64 / 10.0));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len(), 16);
        for i in 0..16 {
            let current = registry.get(&format!("dev{}", i)).unwrap();
            assert_eq!(current.coordinate.latitude(), (i * 10 + 9) as f64 / 10.0);
        }
    }
}

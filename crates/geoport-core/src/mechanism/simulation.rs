use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::identity::DeviceIdentity;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-process fallback: records the simulated position after a short delay.
///
/// Always available and never fails. Clones share the position table.
#[derive(Clone)]
pub struct LocalSimulationMechanism {
    apply_delay: Duration,
    revert_delay: Duration,
    positions: Arc<RwLock<HashMap<String, Coordinate>>>,
}

impl LocalSimulationMechanism {
    pub fn new(apply_delay: Duration, revert_delay: Duration) -> Self {
        Self {
            apply_delay,
            revert_delay,
            positions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn apply(&self, identity: &DeviceIdentity, coordinate: Coordinate) -> Result<()> {
        tokio::time::sleep(self.apply_delay).await;
        self.positions
            .write()
            .await
            .insert(identity.device_id.clone(), coordinate);
        Ok(())
    }

    pub async fn revert(&self, identity: &DeviceIdentity) -> Result<()> {
        tokio::time::sleep(self.revert_delay).await;
        self.positions.write().await.remove(&identity.device_id);
        Ok(())
    }

    /// The position currently simulated for `device_id`, if any.
    pub async fn simulated_position(&self, device_id: &str) -> Option<Coordinate> {
        self.positions.read().await.get(device_id).copied()
    }
}

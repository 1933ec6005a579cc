use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::identity::DeviceIdentity;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Host-specific elevated override API.
///
/// Reached only after the privilege probe reported the API present, so
/// the hook itself has no failure path.
#[async_trait]
pub trait ElevatedOverrideHook: Send + Sync {
    async fn apply(&self, device_id: &str, coordinate: Coordinate);

    async fn revert(&self, device_id: &str);
}

/// Stand-in hook for hosts without a real elevated API: waits, then returns.
#[derive(Debug, Clone)]
pub struct SimulatedElevatedHook {
    apply_delay: Duration,
    revert_delay: Duration,
}

impl SimulatedElevatedHook {
    pub fn new(apply_delay: Duration, revert_delay: Duration) -> Self {
        Self {
            apply_delay,
            revert_delay,
        }
    }
}

#[async_trait]
impl ElevatedOverrideHook for SimulatedElevatedHook {
    async fn apply(&self, device_id: &str, coordinate: Coordinate) {
        tokio::time::sleep(self.apply_delay).await;
        tracing::debug!(
            target: "geoport::mechanism",
            device_id,
            %coordinate,
            "Simulated elevated override applied"
        );
    }

    async fn revert(&self, device_id: &str) {
        tokio::time::sleep(self.revert_delay).await;
        tracing::debug!(
            target: "geoport::mechanism",
            device_id,
            "Simulated elevated override reverted"
        );
    }
}

/// Applies overrides through an [`ElevatedOverrideHook`].
#[derive(Clone)]
pub struct PrivilegedMechanism {
    hook: Arc<dyn ElevatedOverrideHook>,
}

impl PrivilegedMechanism {
    pub fn new(hook: Arc<dyn ElevatedOverrideHook>) -> Self {
        Self { hook }
    }

    pub async fn apply(&self, identity: &DeviceIdentity, coordinate: Coordinate) -> Result<()> {
        self.hook.apply(&identity.device_id, coordinate).await;
        Ok(())
    }

    pub async fn revert(&self, identity: &DeviceIdentity) -> Result<()> {
        self.hook.revert(&identity.device_id).await;
        Ok(())
    }
}

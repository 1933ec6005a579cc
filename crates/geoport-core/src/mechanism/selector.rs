use super::kind::MechanismKind;
use super::network::NetworkServiceMechanism;
use super::privileged::PrivilegedMechanism;
use super::probe::{ConnectivityProbe, PrivilegeProbe};
use super::simulation::LocalSimulationMechanism;
use crate::coordinate::Coordinate;
use crate::error::Result;
use crate::identity::DeviceIdentity;
use std::sync::Arc;

/// One selected mechanism, dispatched by variant.
#[derive(Clone)]
pub enum OverrideMechanism {
    Privileged(PrivilegedMechanism),
    NetworkService(NetworkServiceMechanism),
    LocalSimulation(LocalSimulationMechanism),
}

impl OverrideMechanism {
    pub fn kind(&self) -> MechanismKind {
        match self {
            OverrideMechanism::Privileged(_) => MechanismKind::Privileged,
            OverrideMechanism::NetworkService(_) => MechanismKind::NetworkService,
            OverrideMechanism::LocalSimulation(_) => MechanismKind::LocalSimulation,
        }
    }

    pub async fn apply(&self, identity: &DeviceIdentity, coordinate: Coordinate) -> Result<()> {
        match self {
            OverrideMechanism::Privileged(m) => m.apply(identity, coordinate).await,
            OverrideMechanism::NetworkService(m) => m.apply(identity, coordinate).await,
            OverrideMechanism::LocalSimulation(m) => m.apply(identity, coordinate).await,
        }
    }

    pub async fn revert(&self, identity: &DeviceIdentity) -> Result<()> {
        match self {
            OverrideMechanism::Privileged(m) => m.revert(identity).await,
            OverrideMechanism::NetworkService(m) => m.revert(identity).await,
            OverrideMechanism::LocalSimulation(m) => m.revert(identity).await,
        }
    }
}

/// Picks the first available mechanism in [`MechanismKind::PRIORITY`] order.
///
/// Probes are consulted on every call, never cached. Local simulation is
/// the unconditional last tier, so selection always yields a mechanism.
pub struct MechanismSelector {
    privilege_probe: Arc<dyn PrivilegeProbe>,
    connectivity_probe: Arc<dyn ConnectivityProbe>,
    privileged: PrivilegedMechanism,
    network: NetworkServiceMechanism,
    simulation: LocalSimulationMechanism,
}

impl MechanismSelector {
    pub fn new(
        privilege_probe: Arc<dyn PrivilegeProbe>,
        connectivity_probe: Arc<dyn ConnectivityProbe>,
        privileged: PrivilegedMechanism,
        network: NetworkServiceMechanism,
        simulation: LocalSimulationMechanism,
    ) -> Self {
        Self {
            privilege_probe,
            connectivity_probe,
            privileged,
            network,
            simulation,
        }
    }

    pub fn is_available(&self, kind: MechanismKind) -> bool {
        match kind {
            MechanismKind::Privileged => self.privilege_probe.is_privileged(),
            MechanismKind::NetworkService => self.connectivity_probe.is_reachable(),
            MechanismKind::LocalSimulation => true,
        }
    }

    /// Every kind currently available, in priority order.
    pub fn available_kinds(&self) -> Vec<MechanismKind> {
        MechanismKind::PRIORITY
            .into_iter()
            .filter(|kind| self.is_available(*kind))
            .collect()
    }

    pub fn select(&self) -> OverrideMechanism {
        let kind = MechanismKind::PRIORITY
            .into_iter()
            .find(|kind| self.is_available(*kind))
            .unwrap_or(MechanismKind::LocalSimulation);

        if kind != MechanismKind::Privileged {
            tracing::debug!(
                target: "geoport::mechanism",
                selected = %kind,
                "Higher-priority mechanisms unavailable, falling back"
            );
        }

        self.mechanism_for(kind)
    }

    /// The mechanism for `kind`, regardless of availability.
    pub fn mechanism_for(&self, kind: MechanismKind) -> OverrideMechanism {
        match kind {
            MechanismKind::Privileged => OverrideMechanism::Privileged(self.privileged.clone()),
            MechanismKind::NetworkService => {
                OverrideMechanism::NetworkService(self.network.clone())
            }
            MechanismKind::LocalSimulation => {
                OverrideMechanism::LocalSimulation(self.simulation.clone())
            }
        }
    }

    pub fn simulation(&self) -> &LocalSimulationMechanism {
        &self.simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanism::network::{OverrideServiceClient, SetLocationRequest, StopLocationRequest};
    use crate::mechanism::privileged::SimulatedElevatedHook;
    use crate::mechanism::probe::ProbeFlag;
    use async_trait::async_trait;
    use std::time::Duration;

    struct UnusedClient;

    #[async_trait]
    impl OverrideServiceClient for UnusedClient {
        async fn set_location(&self, _: &str, _: &SetLocationRequest) -> Result<()> {
            Ok(())
        }

        async fn stop_location(&self, _: &str, _: &StopLocationRequest) -> Result<()> {
            Ok(())
        }
    }

    fn selector(privileged: &ProbeFlag, reachable: &ProbeFlag) -> MechanismSelector {
        MechanismSelector::new(
            Arc::new(privileged.clone()),
            Arc::new(reachable.clone()),
            PrivilegedMechanism::new(Arc::new(SimulatedElevatedHook::new(
                Duration::ZERO,
                Duration::ZERO,
            ))),
            NetworkServiceMechanism::new(Arc::new(UnusedClient), Duration::from_secs(10), "1.0"),
            LocalSimulationMechanism::new(Duration::ZERO, Duration::ZERO),
        )
    }

    #[test]
    fn test_priority_order() {
        let privileged = ProbeFlag::new(true);
        let reachable = ProbeFlag::new(true);
        let selector = selector(&privileged, &reachable);

        assert_eq!(selector.select().kind(), MechanismKind::Privileged);

        privileged.set(false);
        assert_eq!(selector.select().kind(), MechanismKind::NetworkService);

        reachable.set(false);
        assert_eq!(selector.select().kind(), MechanismKind::LocalSimulation);
    }

    #[test]
    fn test_reprobes_every_call() {
        let privileged = ProbeFlag::new(false);
        let reachable = ProbeFlag::new(false);
        let selector = selector(&privileged, &reachable);

        assert_eq!(selector.available_kinds(), vec![MechanismKind::LocalSimulation]);
        reachable.set(true);
        assert_eq!(
            selector.available_kinds(),
            vec![MechanismKind::NetworkService, MechanismKind::LocalSimulation]
        );
        assert_eq!(selector.select().kind(), MechanismKind::NetworkService);
    }

    #[test]
    fn test_mechanism_for_ignores_availability() {
        let selector = selector(&ProbeFlag::new(false), &ProbeFlag::new(false));
        assert_eq!(
            selector.mechanism_for(MechanismKind::Privileged).kind(),
            MechanismKind::Privileged
        );
    }
}

//! Wiring of the coordinator and its collaborators.

use crate::coordinator::LocationOverrideCoordinator;
use geoport_core::config::GeoportConfig;
use geoport_core::event::EventBus;
use geoport_core::history::OverrideHistoryStore;
use geoport_core::kv::KeyValueStore;
use geoport_core::mechanism::{
    ConnectivityProbe, ElevatedOverrideHook, LocalSimulationMechanism, MechanismSelector,
    NetworkServiceMechanism, OverrideServiceClient, PrivilegeProbe, PrivilegedMechanism,
    ProbeFlag, SimulatedElevatedHook,
};
use geoport_core::session::SessionRegistry;
use geoport_infrastructure::{MarkerPathPrivilegeProbe, MemoryKeyValueStore};
use geoport_interaction::HttpOverrideServiceClient;
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`LocationOverrideCoordinator`].
///
/// Unset collaborators fall back to:
/// - store: `MemoryKeyValueStore`
/// - privilege probe: `MarkerPathPrivilegeProbe` with the default markers
/// - connectivity probe: a `ProbeFlag` that reports unreachable
/// - service client: `HttpOverrideServiceClient` for `config.service`
/// - elevated hook: `SimulatedElevatedHook` with the configured delays
pub struct CoordinatorBuilder {
    config: GeoportConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    registry: Option<SessionRegistry>,
    privilege_probe: Option<Arc<dyn PrivilegeProbe>>,
    connectivity_probe: Option<Arc<dyn ConnectivityProbe>>,
    service_client: Option<Arc<dyn OverrideServiceClient>>,
    elevated_hook: Option<Arc<dyn ElevatedOverrideHook>>,
}

impl CoordinatorBuilder {
    pub fn new(config: GeoportConfig) -> Self {
        Self {
            config,
            store: None,
            registry: None,
            privilege_probe: None,
            connectivity_probe: None,
            service_client: None,
            elevated_hook: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_registry(mut self, registry: SessionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_privilege_probe(mut self, probe: Arc<dyn PrivilegeProbe>) -> Self {
        self.privilege_probe = Some(probe);
        self
    }

    pub fn with_connectivity_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.connectivity_probe = Some(probe);
        self
    }

    pub fn with_service_client(mut self, client: Arc<dyn OverrideServiceClient>) -> Self {
        self.service_client = Some(client);
        self
    }

    pub fn with_elevated_hook(mut self, hook: Arc<dyn ElevatedOverrideHook>) -> Self {
        self.elevated_hook = Some(hook);
        self
    }

    pub fn build(self) -> LocationOverrideCoordinator {
        let config = self.config;
        let delays = &config.mechanism;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryKeyValueStore::new()));
        let privilege_probe = self
            .privilege_probe
            .unwrap_or_else(|| Arc::new(MarkerPathPrivilegeProbe::default()));
        let connectivity_probe = self
            .connectivity_probe
            .unwrap_or_else(|| Arc::new(ProbeFlag::new(false)));
        let service_client = self
            .service_client
            .unwrap_or_else(|| Arc::new(HttpOverrideServiceClient::from_config(&config.service)));
        let elevated_hook = self.elevated_hook.unwrap_or_else(|| {
            Arc::new(SimulatedElevatedHook::new(
                Duration::from_millis(delays.privileged_apply_delay_ms),
                Duration::from_millis(delays.privileged_revert_delay_ms),
            ))
        });

        let selector = MechanismSelector::new(
            privilege_probe,
            connectivity_probe,
            PrivilegedMechanism::new(elevated_hook),
            NetworkServiceMechanism::new(
                service_client,
                config.service.timeout(),
                config.service.app_version.clone(),
            ),
            LocalSimulationMechanism::new(
                Duration::from_millis(delays.simulation_apply_delay_ms),
                Duration::from_millis(delays.simulation_revert_delay_ms),
            ),
        );

        LocationOverrideCoordinator::new(
            self.registry.unwrap_or_default(),
            Arc::new(OverrideHistoryStore::new(store)),
            Arc::new(selector),
            EventBus::new(config.events.capacity),
            config.history,
        )
    }
}

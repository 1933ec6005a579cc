use anyhow::{Context, Result};
use geoport_application::{CoordinatorBuilder, LocationOverrideCoordinator};
use geoport_core::config::MechanismConfig;
use geoport_infrastructure::probe::service_endpoint;
use geoport_infrastructure::{ConfigLoader, ConnectivityMonitor, FileKeyValueStore, GeoportPaths};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a command needs: the coordinator plus the caller's identity.
///
/// History is persisted under the platform data directory so it survives
/// between invocations. Sessions live only as long as the process.
pub struct AppContext {
    pub coordinator: Arc<LocationOverrideCoordinator>,
    pub device_id: String,
    pub authorization: String,
    monitor_task: Option<JoinHandle<()>>,
}

impl AppContext {
    pub async fn init(
        config_path: Option<&Path>,
        no_delay: bool,
        device_id: &str,
        authorization: &str,
    ) -> Result<Self> {
        let loader = match config_path {
            Some(path) => ConfigLoader::with_path(path),
            None => ConfigLoader::new()?,
        };
        let mut config = loader
            .load()
            .with_context(|| format!("Failed to load config from {}", loader.path().display()))?;
        if no_delay {
            config.mechanism = MechanismConfig::immediate();
        }

        let store_dir = GeoportPaths::store_dir()?;
        let mut builder = CoordinatorBuilder::new(config.clone())
            .with_store(Arc::new(FileKeyValueStore::new(store_dir)));

        let monitor_task = match service_endpoint(&config.service.base_url) {
            Some(endpoint) => {
                let monitor = ConnectivityMonitor::new(endpoint, &config.connectivity);
                monitor.check_once().await;
                builder = builder.with_connectivity_probe(Arc::new(monitor.clone()));
                Some(monitor.spawn())
            }
            None => {
                tracing::warn!(
                    base_url = %config.service.base_url,
                    "Service URL has no host; network mechanism disabled"
                );
                None
            }
        };

        Ok(Self {
            coordinator: Arc::new(builder.build()),
            device_id: device_id.to_string(),
            authorization: authorization.to_string(),
            monitor_task,
        })
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        if let Some(task) = self.monitor_task.take() {
            task.abort();
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

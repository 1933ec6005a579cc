//! Concrete collaborators for the GeoPort core: key-value stores,
//! configuration loading, platform paths and host probes.

pub mod config_loader;
pub mod paths;
pub mod probe;
pub mod storage;

pub use crate::config_loader::{ConfigError, ConfigLoader};
pub use crate::paths::GeoportPaths;
pub use crate::probe::{ConnectivityMonitor, MarkerPathPrivilegeProbe};
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};

//! Domain core of the GeoPort location override coordinator.
//!
//! Holds the validated value types, per-device session and history state,
//! the override mechanisms with their selector, and the contracts for every
//! injected collaborator (probes, key-value persistence, remote service).

pub mod config;
pub mod coordinate;
pub mod error;
pub mod event;
pub mod history;
pub mod identity;
pub mod kv;
pub mod mechanism;
pub mod session;

// Re-export common types
pub use coordinate::Coordinate;
pub use error::{GeoportError, Result};
pub use event::{EventBus, OverrideEvent};
pub use identity::DeviceIdentity;
pub use mechanism::MechanismKind;

//! Application layer for GeoPort.
//!
//! Provides the `LocationOverrideCoordinator` use case, which orchestrates
//! validation, identity checks, mechanism selection, session and history
//! state, and change notifications.

pub mod builder;
pub mod coordinator;
pub mod outcome;

pub use builder::CoordinatorBuilder;
pub use coordinator::LocationOverrideCoordinator;
pub use outcome::{HealthSnapshot, OverrideReceipt, StopOutcome};

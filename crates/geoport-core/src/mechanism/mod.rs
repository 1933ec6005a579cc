//! Override mechanisms and their selection.
//!
//! # Module Structure
//!
//! - `kind`: `MechanismKind`, the closed set of strategies in priority order
//! - `probe`: capability probes consulted by the selector
//! - `privileged`: `PrivilegedMechanism` and its elevated hook contract
//! - `network`: `NetworkServiceMechanism` and the remote service contract
//! - `simulation`: `LocalSimulationMechanism`
//! - `selector`: `OverrideMechanism` dispatch and `MechanismSelector`

mod kind;
mod network;
mod privileged;
mod probe;
mod selector;
mod simulation;

pub use kind::MechanismKind;
pub use network::{
    NetworkServiceMechanism, OverrideServiceClient, SetLocationRequest, StopLocationRequest,
    map_status,
};
pub use privileged::{ElevatedOverrideHook, PrivilegedMechanism, SimulatedElevatedHook};
pub use probe::{ConnectivityProbe, PrivilegeProbe, ProbeFlag};
pub use selector::{MechanismSelector, OverrideMechanism};
pub use simulation::LocalSimulationMechanism;

//! Host capability probes.

mod connectivity;
mod privilege;

pub use connectivity::{ConnectivityMonitor, service_endpoint};
pub use privilege::MarkerPathPrivilegeProbe;

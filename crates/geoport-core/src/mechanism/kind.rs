use serde::{Deserialize, Serialize};

/// The strategies that can realize an override.
///
/// Not persisted; availability is re-probed on every selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MechanismKind {
    Privileged,
    NetworkService,
    LocalSimulation,
}

impl MechanismKind {
    /// Selection order, highest priority first.
    pub const PRIORITY: [MechanismKind; 3] = [
        MechanismKind::Privileged,
        MechanismKind::NetworkService,
        MechanismKind::LocalSimulation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MechanismKind::Privileged => "privileged",
            MechanismKind::NetworkService => "network_service",
            MechanismKind::LocalSimulation => "local_simulation",
        }
    }
}

impl std::fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

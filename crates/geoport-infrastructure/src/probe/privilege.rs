use geoport_core::mechanism::PrivilegeProbe;
use std::path::PathBuf;

/// Paths whose presence indicates an elevated environment with an
/// OS-internal location override API.
const DEFAULT_MARKER_PATHS: &[&str] = &[
    "/Applications/Cydia.app",
    "/Library/MobileSubstrate/MobileSubstrate.dylib",
    "/usr/sbin/sshd",
    "/etc/apt",
    "/private/var/lib/apt/",
    "/private/var/lib/cydia",
    "/private/var/mobile/Library/SBSettings/Themes",
    "/Library/MobileSubstrate/DynamicLibraries/Veency.plist",
    "/Library/MobileSubstrate/DynamicLibraries/LiveClock.plist",
    "/System/Library/LaunchDaemons/com.ikey.bbot.plist",
    "/System/Library/LaunchDaemons/com.saurik.Cydia.Startup.plist",
];

/// Heuristic privilege probe: privileged iff any marker path exists.
///
/// Best-effort only; false positives and negatives are expected on hosts
/// that do not follow the marker layout.
#[derive(Debug, Clone)]
pub struct MarkerPathPrivilegeProbe {
    markers: Vec<PathBuf>,
}

impl MarkerPathPrivilegeProbe {
    pub fn new(markers: Vec<PathBuf>) -> Self {
        Self { markers }
    }
}

impl Default for MarkerPathPrivilegeProbe {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_PATHS.iter().map(PathBuf::from).collect())
    }
}

impl PrivilegeProbe for MarkerPathPrivilegeProbe {
    fn is_privileged(&self) -> bool {
        self.markers.iter().any(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detects_marker() {
        let temp_dir = TempDir::new().unwrap();
        let marker = temp_dir.path().join("marker");

        let probe = MarkerPathPrivilegeProbe::new(vec![
            temp_dir.path().join("absent"),
            marker.clone(),
        ]);
        assert!(!probe.is_privileged());

        std::fs::write(&marker, "").unwrap();
        assert!(probe.is_privileged());
    }

    #[test]
    fn test_empty_marker_list() {
        assert!(!MarkerPathPrivilegeProbe::new(Vec::new()).is_privileged());
    }
}

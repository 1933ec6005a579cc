use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether an elevated, OS-internal override API exists on this host.
pub trait PrivilegeProbe: Send + Sync {
    fn is_privileged(&self) -> bool;
}

/// Reports whether the remote override service is currently reachable.
pub trait ConnectivityProbe: Send + Sync {
    fn is_reachable(&self) -> bool;
}

/// A shared, switchable boolean usable as either probe.
///
/// Clones share the same flag, so a background observer can hold one clone
/// and update it while the selector reads another.
#[derive(Debug, Clone, Default)]
pub struct ProbeFlag {
    value: Arc<AtomicBool>,
}

impl ProbeFlag {
    pub fn new(initial: bool) -> Self {
        Self {
            value: Arc::new(AtomicBool::new(initial)),
        }
    }

    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// Sets the flag, returning the previous value.
    pub fn set(&self, value: bool) -> bool {
        self.value.swap(value, Ordering::AcqRel)
    }
}

impl PrivilegeProbe for ProbeFlag {
    fn is_privileged(&self) -> bool {
        self.get()
    }
}

impl ConnectivityProbe for ProbeFlag {
    fn is_reachable(&self) -> bool {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = ProbeFlag::new(false);
        let observer = flag.clone();

        assert!(!observer.set(true));
        assert!(flag.is_reachable());
        assert!(flag.is_privileged());
    }
}

//! Runtime entry point owning the backend selection.

use std::sync::Arc;

use crate::backend::{Backend, NativeBackend, SimulatedBackend};
use crate::distro::Distro;
use crate::errors::{DistroliteError, DistroliteResult};

/// Main entry point for managing distros.
///
/// Holds the [`Backend`] every handle routes through. Cheaply cloneable;
/// clones share the backend. The backend is injected rather than ambient, so
/// tests can run any number of isolated runtimes in parallel.
#[derive(Clone, Debug)]
pub struct DistroliteRuntime {
    backend: Arc<dyn Backend>,
}

impl DistroliteRuntime {
    /// Build a runtime over an explicit backend.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Runtime over a fresh in-memory store. Deterministic, no external
    /// process; intended for tests.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedBackend::new()))
    }

    /// Runtime delegating to the platform distro manager.
    pub fn native() -> Self {
        Self::new(Arc::new(NativeBackend::new()))
    }

    /// Handle for the named distro. Never fails and implies nothing about
    /// registration.
    pub fn distro(&self, name: impl Into<String>) -> Distro {
        Distro::new(name, Arc::clone(&self.backend))
    }

    /// Stop every registered distro, giving each one an attempt and
    /// collecting per-distro failures.
    pub fn shutdown(&self) -> DistroliteResult<()> {
        self.backend
            .shutdown()
            .map_err(|e| DistroliteError::operation("Shutdown", e))
    }

    /// Handle for the current default distro, or `None` when no usable
    /// default is set.
    pub fn default_distro(&self) -> DistroliteResult<Option<Distro>> {
        let name = self
            .backend
            .default_distro()
            .map_err(|e| DistroliteError::operation("DefaultDistro", e))?;
        Ok(name.map(|n| self.distro(n)))
    }

    /// Handles for every registered distro.
    pub fn registered_distros(&self) -> DistroliteResult<Vec<Distro>> {
        let names = self
            .backend
            .registered_distros()
            .map_err(|e| DistroliteError::operation("RegisteredDistros", e))?;
        Ok(names.into_iter().map(|n| self.distro(n)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_simulated_runtime_is_empty() {
        let runtime = DistroliteRuntime::simulated();
        assert!(runtime.registered_distros().unwrap().is_empty());
        assert!(runtime.default_distro().unwrap().is_none());
    }

    #[test]
    fn test_distro_handle_keeps_its_name() {
        let runtime = DistroliteRuntime::simulated();
        let distro = runtime.distro("Ubuntu");
        assert_eq!(distro.name(), "Ubuntu");
    }

    #[test]
    fn test_clones_share_the_store() {
        let runtime = DistroliteRuntime::simulated();
        let clone = runtime.clone();

        runtime
            .distro("Ubuntu")
            .register("ubuntu.tar.gz")
            .unwrap();

        let names: Vec<String> = clone
            .registered_distros()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, ["Ubuntu"]);
    }
}

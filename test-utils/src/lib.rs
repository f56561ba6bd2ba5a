//! Shared fixtures for distrolite integration tests.

use std::sync::Arc;
use std::time::Duration;

use distrolite::{
    CommandRunner, Distro, DistroliteResult, DistroliteRuntime, SimulatedBackend,
};
use uuid::Uuid;

/// Distro name that cannot collide with one from another test.
pub fn unique_distro_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

/// An isolated simulated runtime plus direct access to its backend, for the
/// hooks the [`distrolite::Backend`] trait does not expose (`start`).
pub struct SimRuntime {
    pub runtime: DistroliteRuntime,
    pub backend: Arc<SimulatedBackend>,
}

impl SimRuntime {
    pub fn new() -> Self {
        distrolite::init_logging();
        let backend = Arc::new(SimulatedBackend::new());
        let runtime = DistroliteRuntime::new(backend.clone());
        Self { runtime, backend }
    }

    /// Register a distro from a throwaway rootfs reference and return its
    /// handle. It comes up `Stopped`.
    pub fn register(&self, name: &str) -> Distro {
        let distro = self.runtime.distro(name);
        distro
            .register("rootfs.tar.gz")
            .expect("setup: could not register test distro");
        distro
    }

    /// Register a distro and launch a guest process in it, leaving it
    /// `Running`.
    pub fn register_running(&self, name: &str) -> Distro {
        let distro = self.register(name);
        self.runner()
            .run_command(name, "sleep 500", Duration::from_secs(30))
            .expect("setup: could not start test distro");
        distro
    }

    /// Command-execution collaborator wired to this runtime's backend.
    pub fn runner(&self) -> SimulatedRunner {
        SimulatedRunner {
            backend: self.backend.clone(),
        }
    }
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Command-execution collaborator for the simulated backend. Launching any
/// command marks the distro `Running`; there is no real guest to produce
/// output.
pub struct SimulatedRunner {
    backend: Arc<SimulatedBackend>,
}

impl CommandRunner for SimulatedRunner {
    fn run_command(
        &self,
        distro: &str,
        _command_line: &str,
        _deadline: Duration,
    ) -> DistroliteResult<String> {
        self.backend.start(distro)?;
        Ok(String::new())
    }
}

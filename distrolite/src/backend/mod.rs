//! Backend trait for platform-specific distro management implementations.

mod native;
mod simulated;

pub use native::NativeBackend;
pub use simulated::SimulatedBackend;

use std::path::Path;
use std::time::Duration;

use uuid::Uuid;

use crate::configuration::Configuration;
use crate::distro::state::DistroState;
use crate::errors::DistroliteResult;

/// Capability surface for distro lifecycle and configuration operations.
///
/// Exactly two implementations exist: [`NativeBackend`] delegates to the
/// platform's distro manager, [`SimulatedBackend`] runs every operation
/// against an in-memory registry store. Core logic goes through this trait
/// and never learns which one it is talking to.
///
/// Operations are synchronous and safe to invoke from parallel threads.
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Import a distro from a rootfs reference. The new distro is `Stopped`
    /// and carries the default [`Configuration`].
    fn register(&self, name: &str, rootfs: &Path) -> DistroliteResult<()>;

    /// Remove a distro's registration. If it was the default, the default
    /// pointer is cleared.
    fn unregister(&self, name: &str) -> DistroliteResult<()>;

    /// Stop every registered distro. Each distro gets an attempt; failures
    /// are collected into [`DistroliteError::Shutdown`] instead of aborting
    /// the sweep.
    ///
    /// [`DistroliteError::Shutdown`]: crate::errors::DistroliteError::Shutdown
    fn shutdown(&self) -> DistroliteResult<()>;

    /// Stop one distro. Idempotent: terminating a stopped distro succeeds.
    fn terminate(&self, name: &str) -> DistroliteResult<()>;

    /// Make this distro the one targeted when no name is given.
    fn set_as_default(&self, name: &str) -> DistroliteResult<()>;

    /// Name of the current default distro. `Ok(None)` when no usable default
    /// is set; never an error.
    fn default_distro(&self) -> DistroliteResult<Option<String>>;

    /// Lifecycle state as a platform listing would report it. A well-formed
    /// name that does not resolve yields `NotRegistered`, not an error.
    fn state(&self, name: &str) -> DistroliteResult<DistroState>;

    /// Identity token assigned at registration.
    fn guid(&self, name: &str) -> DistroliteResult<Uuid>;

    /// Independent snapshot of the distro's configuration.
    fn configuration(&self, name: &str) -> DistroliteResult<Configuration>;

    /// Set the UID guest processes run as by default.
    fn set_default_uid(&self, name: &str, uid: u32) -> DistroliteResult<()>;

    /// Allow or forbid guest processes launching host binaries.
    fn set_interop_enabled(&self, name: &str, enabled: bool) -> DistroliteResult<()>;

    /// Append, or stop appending, the host PATH to the guest PATH.
    fn set_path_appended(&self, name: &str, appended: bool) -> DistroliteResult<()>;

    /// Mount, or stop mounting, host drives into the guest.
    fn set_drive_mounting_enabled(&self, name: &str, enabled: bool) -> DistroliteResult<()>;

    /// Display names of every registered distro.
    fn registered_distros(&self) -> DistroliteResult<Vec<String>>;
}

/// Boundary to the process-execution collaborator.
///
/// Launching a command inside a distro is what moves it `Stopped` →
/// `Running`; the execution itself (process plumbing, deadlines, output
/// capture) lives outside this crate. Test harnesses provide an
/// implementation that drives the simulated backend.
pub trait CommandRunner {
    fn run_command(
        &self,
        distro: &str,
        command_line: &str,
        deadline: Duration,
    ) -> DistroliteResult<String>;
}

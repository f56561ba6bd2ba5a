//! Distro handles.
//!
//! A [`Distro`] is a thin named reference: holding one costs nothing and
//! implies nothing about registration. Every operation resolves the name
//! through the backend at call time, so a handle stays valid across
//! register/unregister cycles.

pub mod state;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use crate::backend::Backend;
use crate::configuration::{Configuration, fields};
use crate::distro::state::DistroState;
use crate::errors::{DistroliteError, DistroliteResult};

/// Named reference to a distro managed through a [`Backend`].
///
/// Obtained from [`DistroliteRuntime::distro`]. Errors coming out of handle
/// methods are annotated with the operation name; the underlying kind is
/// still observable through [`DistroliteError::is_not_registered`] and
/// [`DistroliteError::is_invalid_name`].
///
/// [`DistroliteRuntime::distro`]: crate::runtime::DistroliteRuntime::distro
#[derive(Clone, Debug)]
pub struct Distro {
    name: String,
    backend: Arc<dyn Backend>,
}

impl Distro {
    pub(crate) fn new(name: impl Into<String>, backend: Arc<dyn Backend>) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    /// Display name this handle refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Import the distro from a rootfs reference. It comes up `Stopped`
    /// with the default configuration.
    pub fn register(&self, rootfs: impl AsRef<Path>) -> DistroliteResult<()> {
        self.backend
            .register(&self.name, rootfs.as_ref())
            .map_err(|e| DistroliteError::operation("Register", e))
    }

    /// Remove the distro's registration.
    pub fn unregister(&self) -> DistroliteResult<()> {
        self.backend
            .unregister(&self.name)
            .map_err(|e| DistroliteError::operation("Unregister", e))
    }

    /// Stop every process running inside the distro. Idempotent.
    pub fn terminate(&self) -> DistroliteResult<()> {
        self.backend
            .terminate(&self.name)
            .map_err(|e| DistroliteError::operation("Terminate", e))
    }

    /// Make this the distro targeted when no name is given.
    pub fn set_as_default(&self) -> DistroliteResult<()> {
        self.backend
            .set_as_default(&self.name)
            .map_err(|e| DistroliteError::operation("SetAsDefault", e))
    }

    /// Lifecycle state. A well-formed name that is not registered yields
    /// [`DistroState::NotRegistered`], not an error.
    pub fn state(&self) -> DistroliteResult<DistroState> {
        self.backend
            .state(&self.name)
            .map_err(|e| DistroliteError::operation("State", e))
    }

    /// Whether a registration exists for this name.
    pub fn is_registered(&self) -> DistroliteResult<bool> {
        Ok(self.state()?.is_registered())
    }

    /// Identity token assigned at registration.
    pub fn guid(&self) -> DistroliteResult<Uuid> {
        self.backend
            .guid(&self.name)
            .map_err(|e| DistroliteError::operation("GUID", e))
    }

    /// Independent snapshot of the distro's configuration. Later mutations
    /// are never visible through a previously returned value.
    pub fn configuration(&self) -> DistroliteResult<Configuration> {
        self.backend
            .configuration(&self.name)
            .map_err(|e| DistroliteError::operation("GetConfiguration", e))
    }

    /// Set the UID guest processes run as by default.
    pub fn set_default_uid(&self, uid: u32) -> DistroliteResult<()> {
        self.backend
            .set_default_uid(&self.name, uid)
            .map_err(|e| DistroliteError::operation("SetDefaultUID", e))
    }

    /// Allow or forbid guest processes launching host binaries.
    pub fn set_interop_enabled(&self, enabled: bool) -> DistroliteResult<()> {
        self.backend
            .set_interop_enabled(&self.name, enabled)
            .map_err(|e| DistroliteError::operation("SetInteropEnabled", e))
    }

    /// Append, or stop appending, the host PATH to the guest PATH.
    pub fn set_path_appended(&self, appended: bool) -> DistroliteResult<()> {
        self.backend
            .set_path_appended(&self.name, appended)
            .map_err(|e| DistroliteError::operation("SetPathAppended", e))
    }

    /// Mount, or stop mounting, host drives into the guest.
    pub fn set_drive_mounting_enabled(&self, enabled: bool) -> DistroliteResult<()> {
        self.backend
            .set_drive_mounting_enabled(&self.name, enabled)
            .map_err(|e| DistroliteError::operation("SetDriveMountingEnabled", e))
    }
}

/// Human-readable multi-line summary: name, identity token and full
/// configuration, or a one-line description of why the configuration could
/// not be read. The failure line distinguishes an unregistered distro from
/// a name the platform cannot encode, so callers may match on it.
impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;

        match self.backend.guid(&self.name) {
            Ok(token) => writeln!(f, "guid: '{token}'")?,
            Err(_) => writeln!(f, "guid: distro is not registered")?,
        }

        match self.configuration() {
            Ok(cfg) => {
                writeln!(f, "configuration:")?;
                writeln!(f, "  - {}: {}", fields::VERSION, cfg.version)?;
                writeln!(f, "  - {}: {}", fields::DEFAULT_UID, cfg.default_uid)?;
                writeln!(f, "  - {}: {}", fields::INTEROP_ENABLED, cfg.interop_enabled)?;
                writeln!(f, "  - {}: {}", fields::PATH_APPENDED, cfg.path_appended)?;
                writeln!(
                    f,
                    "  - {}: {}",
                    fields::DRIVE_MOUNTING_ENABLED, cfg.drive_mounting_enabled
                )?;
                writeln!(f, "  - {}:", fields::DEFAULT_ENVIRONMENT_VARIABLES)?;
                for (variable, value) in &cfg.default_environment_variables {
                    writeln!(f, "    - {variable}: {value}")?;
                }
            }
            Err(err) => {
                writeln!(f, "configuration: |")?;
                writeln!(f, "  {err}")?;
            }
        }

        Ok(())
    }
}

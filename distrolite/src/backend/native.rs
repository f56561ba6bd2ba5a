//! Native backend: delegates every operation to the platform's distro
//! manager (syscall surface plus the management executable).
//!
//! Only Windows hosts ship that manager. This build targets hosts without
//! it, so every delegation fails with the `failed syscall to <api>` error
//! class the native variant uses for any platform failure; name validation
//! still happens first, exactly as it would before a real call.

use std::path::Path;

use uuid::Uuid;

use crate::backend::Backend;
use crate::configuration::Configuration;
use crate::distro::state::DistroState;
use crate::errors::{DistroliteError, DistroliteResult};
use crate::registry::validate_distro_name;

/// Entry points of the platform distro manager. Operations driven through
/// the management executable rather than a syscall are reported under the
/// executable's name.
mod api {
    pub const REGISTER: &str = "WslRegisterDistribution";
    pub const UNREGISTER: &str = "WslUnregisterDistribution";
    pub const GET_CONFIGURATION: &str = "WslGetDistributionConfiguration";
    pub const CONFIGURE: &str = "WslConfigureDistribution";
    pub const EXE: &str = "wsl.exe";
}

/// Platform-delegating implementation of [`Backend`].
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> Self {
        Self
    }

    fn unsupported(api: &'static str) -> DistroliteError {
        DistroliteError::syscall(api, "the platform distro manager is not available on this host")
    }
}

impl Backend for NativeBackend {
    fn register(&self, name: &str, _rootfs: &Path) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::REGISTER))
    }

    fn unregister(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::UNREGISTER))
    }

    fn shutdown(&self) -> DistroliteResult<()> {
        Err(Self::unsupported(api::EXE))
    }

    fn terminate(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::EXE))
    }

    fn set_as_default(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::EXE))
    }

    fn default_distro(&self) -> DistroliteResult<Option<String>> {
        Err(Self::unsupported(api::EXE))
    }

    fn state(&self, name: &str) -> DistroliteResult<DistroState> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::EXE))
    }

    fn guid(&self, name: &str) -> DistroliteResult<Uuid> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::EXE))
    }

    fn configuration(&self, name: &str) -> DistroliteResult<Configuration> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::GET_CONFIGURATION))
    }

    fn set_default_uid(&self, name: &str, _uid: u32) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::CONFIGURE))
    }

    fn set_interop_enabled(&self, name: &str, _enabled: bool) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::CONFIGURE))
    }

    fn set_path_appended(&self, name: &str, _appended: bool) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::CONFIGURE))
    }

    fn set_drive_mounting_enabled(&self, name: &str, _enabled: bool) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        Err(Self::unsupported(api::CONFIGURE))
    }

    fn registered_distros(&self) -> DistroliteResult<Vec<String>> {
        Err(Self::unsupported(api::EXE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operations_report_syscall_failure() {
        let backend = NativeBackend::new();

        let err = backend.configuration("Ubuntu").unwrap_err();
        assert!(
            err.to_string()
                .contains("failed syscall to WslGetDistributionConfiguration")
        );

        let err = backend.register("Ubuntu", Path::new("rootfs.tar.gz")).unwrap_err();
        assert!(
            err.to_string()
                .contains("failed syscall to WslRegisterDistribution")
        );
    }

    #[test]
    fn test_invalid_name_beats_delegation() {
        let backend = NativeBackend::new();
        let err = backend.configuration("bad\0name").unwrap_err();
        assert!(err.is_invalid_name());
    }
}

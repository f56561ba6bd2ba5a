//! Simulated backend: the full capability surface against an in-memory
//! store, with no external process. Deterministic and parallel-safe, which
//! is what makes the test suite fast and isolated.

use std::path::Path;

use uuid::Uuid;

use crate::backend::Backend;
use crate::configuration::Configuration;
use crate::distro::state::DistroState;
use crate::errors::{DistroliteError, DistroliteResult, ShutdownFailure};
use crate::registry::{RegistryStore, Value, fields, validate_distro_name};

/// In-memory implementation of [`Backend`].
///
/// Owns its [`RegistryStore`] outright: construct one backend per test and
/// nothing is shared across tests.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    store: RegistryStore,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self {
            store: RegistryStore::new(),
        }
    }

    /// Mark the first guest process as launched, moving the distro
    /// `Stopped` → `Running`.
    ///
    /// This is the hook the command-execution collaborator calls when it
    /// spawns a process inside the guest; it is not part of the [`Backend`]
    /// surface because the native variant starts distros as a side effect of
    /// launching real processes.
    pub fn start(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        self.store.with_node(name, |key| key.write().start())?;
        tracing::debug!(distro = name, "distro running");
        Ok(())
    }

    /// Mutate exactly one field of the distro's configuration subtree.
    fn update_configuration(
        &self,
        name: &str,
        field: &'static str,
        value: Value,
    ) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        self.store.with_node(name, |key| {
            let mut data = key.write();
            let Some(Value::Tree(tree)) = data.fields.get_mut(fields::CONFIGURATION) else {
                return Err(DistroliteError::Internal(
                    "distro key has no configuration subtree".into(),
                ));
            };
            tree.insert(field.to_string(), value);
            Ok(())
        })?;
        tracing::debug!(distro = name, field, "updated configuration");
        Ok(())
    }
}

impl Backend for SimulatedBackend {
    fn register(&self, name: &str, rootfs: &Path) -> DistroliteResult<()> {
        self.store
            .register(name, &rootfs.display().to_string())
            .map(|_| ())
    }

    fn unregister(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        let (token, _) = self
            .store
            .find_by_name(name)
            .ok_or(DistroliteError::NotRegistered)?;
        self.store.unregister(token)
    }

    fn shutdown(&self) -> DistroliteResult<()> {
        let snapshot = self.store.snapshot_distros();
        tracing::debug!(distros = snapshot.len(), "shutting down all distros");

        let mut failures = Vec::new();
        for (token, name, _) in snapshot {
            // Re-resolve by token: a distro unregistered since the snapshot
            // was taken is reported, not silently skipped.
            let result = match self.store.lookup(token) {
                Some(key) => key.write().terminate(),
                None => Err(DistroliteError::NotRegistered),
            };
            if let Err(source) = result {
                failures.push(ShutdownFailure {
                    name,
                    source: Box::new(source),
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DistroliteError::Shutdown(failures))
        }
    }

    fn terminate(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;
        self.store.with_node(name, |key| key.write().terminate())?;
        tracing::debug!(distro = name, "distro stopped");
        Ok(())
    }

    fn set_as_default(&self, name: &str) -> DistroliteResult<()> {
        self.store.set_default(name)
    }

    fn default_distro(&self) -> DistroliteResult<Option<String>> {
        Ok(self.store.default_distro_name())
    }

    fn state(&self, name: &str) -> DistroliteResult<DistroState> {
        validate_distro_name(name)?;
        match self.store.find_by_name(name) {
            Some((_, key)) => Ok(key.read().state()),
            None => Ok(DistroState::NotRegistered),
        }
    }

    fn guid(&self, name: &str) -> DistroliteResult<Uuid> {
        validate_distro_name(name)?;
        self.store
            .find_by_name(name)
            .map(|(token, _)| token)
            .ok_or(DistroliteError::NotRegistered)
    }

    fn configuration(&self, name: &str) -> DistroliteResult<Configuration> {
        validate_distro_name(name)?;
        self.store.with_node(name, |key| {
            let data = key.read();
            let value = data.field(fields::CONFIGURATION).ok_or_else(|| {
                DistroliteError::Internal("distro key has no configuration subtree".into())
            })?;
            Configuration::from_value(value)
        })
    }

    fn set_default_uid(&self, name: &str, uid: u32) -> DistroliteResult<()> {
        self.update_configuration(
            name,
            crate::configuration::fields::DEFAULT_UID,
            Value::Uint(uid.into()),
        )
    }

    fn set_interop_enabled(&self, name: &str, enabled: bool) -> DistroliteResult<()> {
        self.update_configuration(
            name,
            crate::configuration::fields::INTEROP_ENABLED,
            Value::Bool(enabled),
        )
    }

    fn set_path_appended(&self, name: &str, appended: bool) -> DistroliteResult<()> {
        self.update_configuration(
            name,
            crate::configuration::fields::PATH_APPENDED,
            Value::Bool(appended),
        )
    }

    fn set_drive_mounting_enabled(&self, name: &str, enabled: bool) -> DistroliteResult<()> {
        self.update_configuration(
            name,
            crate::configuration::fields::DRIVE_MOUNTING_ENABLED,
            Value::Bool(enabled),
        )
    }

    fn registered_distros(&self) -> DistroliteResult<Vec<String>> {
        Ok(self.store.registered_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(backend: &SimulatedBackend, name: &str) {
        backend.register(name, Path::new("rootfs.tar.gz")).unwrap();
    }

    #[test]
    fn test_register_then_state_is_stopped() {
        let backend = SimulatedBackend::new();
        registered(&backend, "Ubuntu");
        assert_eq!(backend.state("Ubuntu").unwrap(), DistroState::Stopped);
    }

    #[test]
    fn test_start_and_terminate_cycle() {
        let backend = SimulatedBackend::new();
        registered(&backend, "Ubuntu");

        backend.start("Ubuntu").unwrap();
        assert_eq!(backend.state("Ubuntu").unwrap(), DistroState::Running);

        // Starting a running distro is a no-op.
        backend.start("Ubuntu").unwrap();
        assert_eq!(backend.state("Ubuntu").unwrap(), DistroState::Running);

        backend.terminate("Ubuntu").unwrap();
        assert_eq!(backend.state("Ubuntu").unwrap(), DistroState::Stopped);

        // Terminate is idempotent.
        backend.terminate("Ubuntu").unwrap();
        assert_eq!(backend.state("Ubuntu").unwrap(), DistroState::Stopped);
    }

    #[test]
    fn test_terminate_unknown_distro() {
        let backend = SimulatedBackend::new();
        let err = backend.terminate("Ghost").unwrap_err();
        assert!(err.is_not_registered());
    }

    #[test]
    fn test_state_of_unknown_name_is_not_an_error() {
        let backend = SimulatedBackend::new();
        assert_eq!(
            backend.state("Ghost").unwrap(),
            DistroState::NotRegistered
        );
    }

    #[test]
    fn test_guid_is_stable_across_queries() {
        let backend = SimulatedBackend::new();
        registered(&backend, "Ubuntu");

        let first = backend.guid("Ubuntu").unwrap();
        let second = backend.guid("Ubuntu").unwrap();
        assert_eq!(first, second);
        assert!(!first.is_nil());
    }

    #[test]
    fn test_configuration_snapshot_is_independent() {
        let backend = SimulatedBackend::new();
        registered(&backend, "Ubuntu");

        let before = backend.configuration("Ubuntu").unwrap();
        backend.set_default_uid("Ubuntu", 1000).unwrap();
        let after = backend.configuration("Ubuntu").unwrap();

        // The earlier snapshot must not observe the mutation.
        assert_eq!(before.default_uid, 0);
        assert_eq!(after.default_uid, 1000);
    }

    #[test]
    fn test_setter_touches_exactly_one_field() {
        let backend = SimulatedBackend::new();
        registered(&backend, "Ubuntu");

        backend.set_interop_enabled("Ubuntu", false).unwrap();

        let cfg = backend.configuration("Ubuntu").unwrap();
        let expected = Configuration {
            interop_enabled: false,
            ..Default::default()
        };
        assert_eq!(cfg, expected);
    }

    #[test]
    fn test_shutdown_stops_every_distro() {
        let backend = SimulatedBackend::new();
        registered(&backend, "A");
        registered(&backend, "B");
        backend.start("A").unwrap();
        backend.start("B").unwrap();

        backend.shutdown().unwrap();
        assert_eq!(backend.state("A").unwrap(), DistroState::Stopped);
        assert_eq!(backend.state("B").unwrap(), DistroState::Stopped);
    }

    #[test]
    fn test_nul_byte_name_fails_every_operation() {
        let backend = SimulatedBackend::new();
        let bad = "Wrong character \0 in name";

        assert!(
            backend
                .register(bad, Path::new("rootfs.tar.gz"))
                .unwrap_err()
                .is_invalid_name()
        );
        assert!(backend.unregister(bad).unwrap_err().is_invalid_name());
        assert!(backend.terminate(bad).unwrap_err().is_invalid_name());
        assert!(backend.set_as_default(bad).unwrap_err().is_invalid_name());
        assert!(backend.state(bad).unwrap_err().is_invalid_name());
        assert!(backend.guid(bad).unwrap_err().is_invalid_name());
        assert!(backend.configuration(bad).unwrap_err().is_invalid_name());
        assert!(
            backend
                .set_default_uid(bad, 1000)
                .unwrap_err()
                .is_invalid_name()
        );

        assert!(backend.registered_distros().unwrap().is_empty());
    }
}

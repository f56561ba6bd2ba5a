//! In-memory registry store backing the simulated backend.
//!
//! The tree mirrors the shape of the platform's configuration store: a root
//! key whose children are keyed by each registered distro's identity token,
//! plus a reserved root field pointing at the default distro. It exists only
//! for the lifetime of the process; nothing is persisted.
//!
//! Locking is two-tiered. The root key's lock is the structural lock, held
//! for anything that adds or removes children or moves the default pointer.
//! Each child key carries its own lock for state transitions and
//! configuration edits, so unrelated distros never contend. Acquisition
//! order is always root-then-child.

mod key;

pub use key::{KeyData, RegistryKey, Value};

use std::sync::Arc;

use uuid::Uuid;

use crate::configuration::Configuration;
use crate::distro::state::DistroState;
use crate::errors::{DistroliteError, DistroliteResult};

/// Path of the root key in the platform store this tree simulates.
pub(crate) const ROOT_PATH: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Lxss";

/// Field labels on registry keys.
pub mod fields {
    /// Display name of a distro, on each distro key.
    pub const DISTRIBUTION_NAME: &str = "DistributionName";
    /// Identity token of the default distro, on the root key. Empty = unset.
    pub const DEFAULT_DISTRIBUTION: &str = "DefaultDistribution";
    /// Rootfs reference the distro was registered from, on each distro key.
    pub const SOURCE: &str = "Source";
    /// Configuration subtree, on each distro key.
    pub const CONFIGURATION: &str = "Configuration";
}

/// Reject names the platform cannot represent.
///
/// Runs before any lock is taken; a failing name never touches the store.
pub fn validate_distro_name(name: &str) -> DistroliteResult<()> {
    // A NUL byte cannot survive the wide-string conversion the platform
    // performs on every name it receives.
    if name.bytes().any(|b| b == 0) {
        return Err(DistroliteError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Concurrency-safe holder of all distro identities, state and configuration.
///
/// The store is an explicit value handed to the backend that owns it, never
/// ambient process state, so parallel tests each get an isolated tree.
#[derive(Debug)]
pub struct RegistryStore {
    root: Arc<RegistryKey>,
}

impl RegistryStore {
    /// Build an empty store, seeded the way a fresh platform install looks:
    /// no registered distros, an unset default pointer, and the installer
    /// cache key the platform leaves under the root.
    pub fn new() -> Self {
        let root = RegistryKey::new(ROOT_PATH);
        {
            let mut data = root.write();
            data.set_field(fields::DEFAULT_DISTRIBUTION, Value::Str(String::new()));
            data.children.insert(
                "AppxInstallerCache".to_string(),
                Arc::new(RegistryKey::new(format!(
                    r"{ROOT_PATH}\AppxInstallerCache"
                ))),
            );
        }
        Self {
            root: Arc::new(root),
        }
    }

    /// Resolve a display name to its identity token and key.
    ///
    /// Linear scan over the root's children with exact string equality;
    /// children whose label is not a well-formed token are not distros and
    /// are skipped. The first match wins; registration keeps names unique,
    /// so two children sharing a name can only be produced from outside this
    /// crate, and which of them wins is unspecified.
    pub fn find_by_name(&self, name: &str) -> Option<(Uuid, Arc<RegistryKey>)> {
        let root = self.root.read();
        Self::scan(&root, name)
    }

    /// Scan under an already-held structural lock.
    fn scan(root: &KeyData, name: &str) -> Option<(Uuid, Arc<RegistryKey>)> {
        for (label, key) in &root.children {
            let Ok(token) = Uuid::parse_str(label) else {
                // Not a distro key.
                continue;
            };
            if key.read().field(fields::DISTRIBUTION_NAME).and_then(Value::as_str) == Some(name) {
                return Some((token, Arc::clone(key)));
            }
        }
        None
    }

    /// Insert a new distro key with a fresh identity token, default
    /// configuration and `Stopped` state.
    pub fn register(&self, name: &str, source: &str) -> DistroliteResult<Uuid> {
        validate_distro_name(name)?;

        let mut root = self.root.write();
        if Self::scan(&root, name).is_some() {
            return Err(DistroliteError::AlreadyRegistered(name.to_string()));
        }

        let token = Uuid::new_v4();
        let key = RegistryKey::new(format!(r"{ROOT_PATH}\{token}"));
        {
            let mut data = key.write();
            data.set_field(fields::DISTRIBUTION_NAME, Value::Str(name.to_string()));
            data.set_field(fields::SOURCE, Value::Str(source.to_string()));
            data.set_field(fields::CONFIGURATION, Configuration::default().to_value());
            data.transition_to(DistroState::Stopped)?;
        }
        root.children.insert(token.to_string(), Arc::new(key));

        tracing::debug!(distro = name, %token, "registered distro");
        Ok(token)
    }

    /// Remove a distro key. Clears the default pointer if it referenced the
    /// removed token.
    pub fn unregister(&self, token: Uuid) -> DistroliteResult<()> {
        let mut root = self.root.write();
        let label = token.to_string();
        root.children
            .remove(&label)
            .ok_or(DistroliteError::NotRegistered)?;

        let was_default = root
            .field(fields::DEFAULT_DISTRIBUTION)
            .and_then(Value::as_str)
            .is_some_and(|current| current == label);
        if was_default {
            root.set_field(fields::DEFAULT_DISTRIBUTION, Value::Str(String::new()));
            tracing::debug!(%token, "cleared default distro pointer");
        }

        tracing::debug!(%token, "unregistered distro");
        Ok(())
    }

    /// Point the default-distro field at the named distro.
    ///
    /// Name resolution and the pointer write happen under one structural
    /// write lock, so a concurrent unregistration can never leave the pointer
    /// referencing a half-resolved distro.
    pub fn set_default(&self, name: &str) -> DistroliteResult<()> {
        validate_distro_name(name)?;

        let mut root = self.root.write();
        let (token, _) = Self::scan(&root, name).ok_or(DistroliteError::NotRegistered)?;
        root.set_field(
            fields::DEFAULT_DISTRIBUTION,
            Value::Str(token.to_string()),
        );

        tracing::debug!(distro = name, %token, "set default distro");
        Ok(())
    }

    /// Identity token currently stored in the default pointer, if any.
    pub fn default_token(&self) -> Option<Uuid> {
        let root = self.root.read();
        root.field(fields::DEFAULT_DISTRIBUTION)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Name of the default distro.
    ///
    /// An unset pointer is not an error. A dangling pointer (token no longer
    /// present) is treated the same way: no usable default.
    pub fn default_distro_name(&self) -> Option<String> {
        let root = self.root.read();
        let label = root
            .field(fields::DEFAULT_DISTRIBUTION)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())?
            .to_string();
        let key = root.children.get(&label)?;
        key.read()
            .field(fields::DISTRIBUTION_NAME)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Look up a distro key by identity token.
    pub fn lookup(&self, token: Uuid) -> Option<Arc<RegistryKey>> {
        let root = self.root.read();
        root.children.get(&token.to_string()).map(Arc::clone)
    }

    /// Snapshot of every registered distro, taken under one structural read
    /// lock. Callers iterate the snapshot without holding any lock, so work
    /// on one distro never blocks another.
    pub fn snapshot_distros(&self) -> Vec<(Uuid, String, Arc<RegistryKey>)> {
        let root = self.root.read();
        root.children
            .iter()
            .filter_map(|(label, key)| {
                let token = Uuid::parse_str(label).ok()?;
                let name = key
                    .read()
                    .field(fields::DISTRIBUTION_NAME)
                    .and_then(Value::as_str)?
                    .to_string();
                Some((token, name, Arc::clone(key)))
            })
            .collect()
    }

    /// Display names of every registered distro.
    pub fn registered_names(&self) -> Vec<String> {
        self.snapshot_distros()
            .into_iter()
            .map(|(_, name, _)| name)
            .collect()
    }

    /// Resolve `name` and hand its key to `f` with no structural lock held.
    ///
    /// This is the single chokepoint through which per-distro reads and
    /// mutations reach the tree; `f` acquires the per-node lock at whatever
    /// intent it needs.
    pub fn with_node<T>(
        &self,
        name: &str,
        f: impl FnOnce(&RegistryKey) -> DistroliteResult<T>,
    ) -> DistroliteResult<T> {
        let (_, key) = self
            .find_by_name(name)
            .ok_or(DistroliteError::NotRegistered)?;
        f(&key)
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

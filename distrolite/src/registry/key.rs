//! Registry keys: the nodes of the simulated configuration tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::distro::state::DistroState;
use crate::errors::{DistroliteError, DistroliteResult};

/// A single field value stored in a registry key.
///
/// The platform store is dynamically typed; this tagged variant keeps the
/// tree shape uniform without giving up type safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Uint(u64),
    Bool(bool),
    /// Nested map, used for composite fields such as the per-distro
    /// configuration and its environment-variable block.
    Tree(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Tree(t) => Some(t),
            _ => None,
        }
    }
}

/// One node of the registry tree.
///
/// The root key doubles as the structural lock: its `RwLock` guards the
/// children map and the root fields (the default-distro pointer). Each child
/// key's lock is the per-node lock guarding that distro's fields and state.
/// Lock order is always root-then-child.
#[derive(Debug)]
pub struct RegistryKey {
    path: String,
    inner: RwLock<KeyData>,
}

/// Mutable contents of a key, behind its lock.
///
/// `state` lives beside the fields rather than inside them: it is runtime
/// bookkeeping the real platform never persists.
#[derive(Debug)]
pub struct KeyData {
    pub(crate) children: HashMap<String, Arc<RegistryKey>>,
    pub(crate) fields: HashMap<String, Value>,
    state: DistroState,
    last_updated: DateTime<Utc>,
}

impl RegistryKey {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            inner: RwLock::new(KeyData {
                children: HashMap::new(),
                fields: HashMap::new(),
                state: DistroState::NotRegistered,
                last_updated: Utc::now(),
            }),
        }
    }

    /// Path label of this key, for diagnostics.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Acquire this key's lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, KeyData> {
        self.inner.read()
    }

    /// Acquire this key's lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, KeyData> {
        self.inner.write()
    }
}

impl KeyData {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn state(&self) -> DistroState {
        self.state
    }

    /// Timestamp of the last registration or state change, UTC.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Apply a validated state transition.
    ///
    /// Idempotent callers (terminate on a stopped distro) must short-circuit
    /// before calling; identity transitions are rejected here.
    pub(crate) fn transition_to(&mut self, target: DistroState) -> DistroliteResult<()> {
        if !self.state.can_transition_to(target) {
            return Err(DistroliteError::Internal(format!(
                "cannot transition from {} to {}",
                self.state, target
            )));
        }
        self.state = target;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Mark the first guest process as launched. No-op when already running.
    pub(crate) fn start(&mut self) -> DistroliteResult<()> {
        if self.state.is_running() {
            return Ok(());
        }
        self.transition_to(DistroState::Running)
    }

    /// Kill every guest process. No-op when already stopped.
    pub(crate) fn terminate(&mut self) -> DistroliteResult<()> {
        if self.state.is_stopped() {
            return Ok(());
        }
        self.transition_to(DistroState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Str("a".into()).as_str(), Some("a"));
        assert_eq!(Value::Uint(7).as_uint(), Some(7));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Tree(BTreeMap::new()).as_tree().is_some());

        assert_eq!(Value::Uint(7).as_str(), None);
        assert_eq!(Value::Str("a".into()).as_bool(), None);
    }

    #[test]
    fn test_fresh_key_is_not_registered() {
        let key = RegistryKey::new("root/test");
        assert_eq!(key.read().state(), DistroState::NotRegistered);
        assert_eq!(key.path(), "root/test");
    }

    #[test]
    fn test_transition_updates_timestamp() {
        let key = RegistryKey::new("root/test");
        let before = key.read().last_updated();

        key.write().transition_to(DistroState::Stopped).unwrap();

        let data = key.read();
        assert_eq!(data.state(), DistroState::Stopped);
        assert!(data.last_updated() >= before);
    }

    #[test]
    fn test_identity_transition_is_rejected() {
        let key = RegistryKey::new("root/test");
        key.write().transition_to(DistroState::Stopped).unwrap();

        let result = key.write().transition_to(DistroState::Stopped);
        assert!(result.is_err());
        assert_eq!(key.read().state(), DistroState::Stopped);
    }
}

//! Per-distro configuration model.
//!
//! `Configuration` is a pure value object: defaults here must match what the
//! platform writes for a freshly imported distro, byte for byte, because
//! callers assert on the exact snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{DistroliteError, DistroliteResult};
use crate::registry::Value;

/// Protocol version written for every new registration. Read-only.
pub const CONFIGURATION_VERSION: u8 = 2;

/// Field labels used both as registry tree keys and rendering labels.
pub(crate) mod fields {
    pub const VERSION: &str = "Version";
    pub const DEFAULT_UID: &str = "DefaultUID";
    pub const INTEROP_ENABLED: &str = "InteropEnabled";
    pub const PATH_APPENDED: &str = "PathAppended";
    pub const DRIVE_MOUNTING_ENABLED: &str = "DriveMountingEnabled";
    pub const DEFAULT_ENVIRONMENT_VARIABLES: &str = "DefaultEnvironmentVariables";
}

const DEFAULT_PATH: &str =
    "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin:/usr/games:/usr/local/games";

/// Settings attached to a registered distro.
///
/// `version` and `default_environment_variables` are read-only through the
/// configuration surface; the remaining fields have a dedicated setter on the
/// [`Distro`] handle.
///
/// [`Distro`]: crate::distro::Distro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Fixed protocol version, currently 2.
    pub version: u8,

    /// UID of the user guest processes run as by default. 0 is root.
    pub default_uid: u32,

    /// Whether guest processes may launch host binaries.
    pub interop_enabled: bool,

    /// Whether the host PATH is appended to the guest PATH.
    pub path_appended: bool,

    /// Whether host drives are mounted into the guest.
    pub drive_mounting_enabled: bool,

    /// Environment defaults for guest sessions. Ordered so rendering and
    /// comparison are deterministic.
    pub default_environment_variables: BTreeMap<String, String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: CONFIGURATION_VERSION,
            default_uid: 0,
            interop_enabled: true,
            path_appended: true,
            drive_mounting_enabled: true,
            default_environment_variables: default_environment_variables(),
        }
    }
}

fn default_environment_variables() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("HOSTTYPE".to_string(), "x86_64".to_string()),
        ("LANG".to_string(), "en_US.UTF-8".to_string()),
        ("PATH".to_string(), DEFAULT_PATH.to_string()),
        ("TERM".to_string(), "xterm-256color".to_string()),
    ])
}

impl Configuration {
    /// Encode as a registry subtree, the shape stored under each distro key.
    pub(crate) fn to_value(&self) -> Value {
        let env = self
            .default_environment_variables
            .iter()
            .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
            .collect();

        Value::Tree(BTreeMap::from([
            (fields::VERSION.to_string(), Value::Uint(self.version.into())),
            (
                fields::DEFAULT_UID.to_string(),
                Value::Uint(self.default_uid.into()),
            ),
            (
                fields::INTEROP_ENABLED.to_string(),
                Value::Bool(self.interop_enabled),
            ),
            (
                fields::PATH_APPENDED.to_string(),
                Value::Bool(self.path_appended),
            ),
            (
                fields::DRIVE_MOUNTING_ENABLED.to_string(),
                Value::Bool(self.drive_mounting_enabled),
            ),
            (
                fields::DEFAULT_ENVIRONMENT_VARIABLES.to_string(),
                Value::Tree(env),
            ),
        ]))
    }

    /// Decode a registry subtree back into an owned snapshot.
    ///
    /// Fails with [`DistroliteError::Internal`] if the tree does not have the
    /// shape written by [`Configuration::to_value`]; the store only ever
    /// holds trees produced there.
    pub(crate) fn from_value(value: &Value) -> DistroliteResult<Self> {
        let tree = value
            .as_tree()
            .ok_or_else(|| DistroliteError::Internal("configuration is not a subtree".into()))?;

        let uint = |field: &str| -> DistroliteResult<u64> {
            tree.get(field)
                .and_then(Value::as_uint)
                .ok_or_else(|| DistroliteError::Internal(format!("missing uint field {field}")))
        };
        let flag = |field: &str| -> DistroliteResult<bool> {
            tree.get(field)
                .and_then(Value::as_bool)
                .ok_or_else(|| DistroliteError::Internal(format!("missing bool field {field}")))
        };

        let env = tree
            .get(fields::DEFAULT_ENVIRONMENT_VARIABLES)
            .and_then(Value::as_tree)
            .ok_or_else(|| {
                DistroliteError::Internal("missing default environment variables".into())
            })?
            .iter()
            .map(|(k, v)| {
                v.as_str()
                    .map(|s| (k.clone(), s.to_string()))
                    .ok_or_else(|| {
                        DistroliteError::Internal(format!("environment variable {k} is not a string"))
                    })
            })
            .collect::<DistroliteResult<BTreeMap<_, _>>>()?;

        Ok(Self {
            version: uint(fields::VERSION)? as u8,
            default_uid: uint(fields::DEFAULT_UID)? as u32,
            interop_enabled: flag(fields::INTEROP_ENABLED)?,
            path_appended: flag(fields::PATH_APPENDED)?,
            drive_mounting_enabled: flag(fields::DRIVE_MOUNTING_ENABLED)?,
            default_environment_variables: env,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let cfg = Configuration::default();
        assert_eq!(cfg.version, 2);
        assert_eq!(cfg.default_uid, 0);
        assert!(cfg.interop_enabled);
        assert!(cfg.path_appended);
        assert!(cfg.drive_mounting_enabled);

        let env = &cfg.default_environment_variables;
        assert_eq!(env.len(), 4);
        assert_eq!(env["HOSTTYPE"], "x86_64");
        assert_eq!(env["LANG"], "en_US.UTF-8");
        assert_eq!(env["PATH"], DEFAULT_PATH);
        assert_eq!(env["TERM"], "xterm-256color");
    }

    #[test]
    fn test_value_round_trip() {
        let cfg = Configuration {
            default_uid: 1000,
            interop_enabled: false,
            ..Default::default()
        };

        let decoded = Configuration::from_value(&cfg.to_value()).unwrap();
        assert_eq!(decoded, cfg);
    }

    #[test]
    fn test_from_value_rejects_foreign_shapes() {
        assert!(Configuration::from_value(&Value::Str("nope".into())).is_err());
        assert!(Configuration::from_value(&Value::Tree(BTreeMap::new())).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let cfg = Configuration::default();
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(serde_json::from_str::<Configuration>(&json).unwrap(), cfg);
    }
}

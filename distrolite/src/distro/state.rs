//! Distro lifecycle state and state machine.
//!
//! Defines the possible states of a distro and valid transitions between
//! them.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a distro, as a platform listing would report it.
///
/// State machine:
/// ```text
/// register()   → Stopped (node present in the registry, nothing running)
/// start()      → Running (first process launched inside the guest)
/// terminate()  → Stopped (all guest processes killed, registration kept)
/// unregister() → NotRegistered (node removed)
/// ```
///
/// `NotRegistered` is represented by absence in the registry store; a distro
/// key is never stored with this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistroState {
    /// No registry node exists for this name.
    NotRegistered,

    /// Registered, no process running inside the guest.
    Stopped,

    /// Registered and at least one guest process is alive.
    Running,
}

impl DistroState {
    /// Check if a registry node exists for the distro.
    pub fn is_registered(&self) -> bool {
        !matches!(self, DistroState::NotRegistered)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, DistroState::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, DistroState::Stopped)
    }

    /// Check if transition to the target state is valid.
    ///
    /// Idempotent operations (`terminate` on a stopped distro, `start` on a
    /// running one) short-circuit before consulting this matrix, so identity
    /// transitions are not listed.
    pub fn can_transition_to(&self, target: DistroState) -> bool {
        use DistroState::*;
        matches!(
            (self, target),
            // NotRegistered → Stopped (registration)
            (NotRegistered, Stopped) |
            // Stopped → Running (first process launched)
            (Stopped, Running) |
            // Running → Stopped (terminate)
            (Running, Stopped) |
            // Stopped | Running → NotRegistered (unregister)
            (Stopped, NotRegistered) |
            (Running, NotRegistered)
        )
    }

    /// Convert to string for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistroState::NotRegistered => "not-registered",
            DistroState::Stopped => "stopped",
            DistroState::Running => "running",
        }
    }
}

impl std::str::FromStr for DistroState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-registered" => Ok(DistroState::NotRegistered),
            "stopped" => Ok(DistroState::Stopped),
            "running" => Ok(DistroState::Running),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DistroState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_registered() {
        assert!(!DistroState::NotRegistered.is_registered());
        assert!(DistroState::Stopped.is_registered());
        assert!(DistroState::Running.is_registered());
    }

    #[test]
    fn test_is_running() {
        assert!(!DistroState::NotRegistered.is_running());
        assert!(!DistroState::Stopped.is_running());
        assert!(DistroState::Running.is_running());
    }

    #[test]
    fn test_valid_transitions() {
        // Registration
        assert!(DistroState::NotRegistered.can_transition_to(DistroState::Stopped));
        assert!(!DistroState::NotRegistered.can_transition_to(DistroState::Running));

        // Start and terminate
        assert!(DistroState::Stopped.can_transition_to(DistroState::Running));
        assert!(DistroState::Running.can_transition_to(DistroState::Stopped));

        // Unregister is reachable from both registered states
        assert!(DistroState::Stopped.can_transition_to(DistroState::NotRegistered));
        assert!(DistroState::Running.can_transition_to(DistroState::NotRegistered));

        // Identity transitions are handled as no-ops upstream
        assert!(!DistroState::Stopped.can_transition_to(DistroState::Stopped));
        assert!(!DistroState::Running.can_transition_to(DistroState::Running));
    }

    #[test]
    fn test_as_str_round_trip() {
        for state in [
            DistroState::NotRegistered,
            DistroState::Stopped,
            DistroState::Running,
        ] {
            assert_eq!(state.as_str().parse(), Ok(state));
        }
        assert!("invalid".parse::<DistroState>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DistroState::NotRegistered).unwrap();
        assert_eq!(json, "\"not-registered\"");
        assert_eq!(
            serde_json::from_str::<DistroState>("\"running\"").unwrap(),
            DistroState::Running
        );
    }
}

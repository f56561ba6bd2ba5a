//! Error types shared by every distrolite component.
//!
//! Display strings are part of the public contract: callers pattern-match on
//! the `distro not registered`, `failed to convert ... to UTF16` and
//! `failed syscall to ...` substrings, so variants here must not reword them.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type DistroliteResult<T> = Result<T, DistroliteError>;

/// Errors produced by distro lifecycle and configuration operations.
#[derive(Debug, Error)]
pub enum DistroliteError {
    /// The distro name cannot be handed to the platform: it contains a NUL
    /// byte or fails wide-string conversion. Detected before any lock is
    /// taken, so the store is never touched.
    #[error("failed to convert {0:?} to UTF16")]
    InvalidName(String),

    /// The name (or identity token) does not resolve to a registered distro.
    #[error("distro not registered")]
    NotRegistered,

    /// Register was called for a name that already resolves.
    #[error("distro {0:?} is already registered")]
    AlreadyRegistered(String),

    /// A native platform call failed for a reason opaque to this crate.
    /// Wrapped verbatim, never reinterpreted.
    #[error("failed syscall to {api}: {reason}")]
    Syscall { api: &'static str, reason: String },

    /// Combined per-distro failures from [`Backend::shutdown`], one entry per
    /// distro that could not be stopped. Successes are not suppressed.
    ///
    /// [`Backend::shutdown`]: crate::backend::Backend::shutdown
    #[error("{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Shutdown(Vec<ShutdownFailure>),

    /// Caller-facing annotation added by the `Distro` handle. The wrapped
    /// error keeps its kind and its message stays in the Display output.
    #[error("error in {op}: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<DistroliteError>,
    },

    /// The registry tree holds data this crate did not write. Indicates a
    /// bug, not a user error.
    #[error("registry misuse: {0}")]
    Internal(String),
}

/// A single distro that `shutdown` failed to stop.
#[derive(Debug, Error)]
#[error("could not terminate {name}: {source}")]
pub struct ShutdownFailure {
    pub name: String,
    #[source]
    pub source: Box<DistroliteError>,
}

impl DistroliteError {
    pub(crate) fn operation(op: &'static str, source: DistroliteError) -> Self {
        DistroliteError::Operation {
            op,
            source: Box::new(source),
        }
    }

    pub(crate) fn syscall(api: &'static str, reason: impl Into<String>) -> Self {
        DistroliteError::Syscall {
            api,
            reason: reason.into(),
        }
    }

    /// True if this error, or the error it annotates, is [`NotRegistered`].
    ///
    /// [`NotRegistered`]: DistroliteError::NotRegistered
    pub fn is_not_registered(&self) -> bool {
        match self {
            DistroliteError::NotRegistered => true,
            DistroliteError::Operation { source, .. } => source.is_not_registered(),
            _ => false,
        }
    }

    /// True if this error, or the error it annotates, is [`InvalidName`].
    ///
    /// [`InvalidName`]: DistroliteError::InvalidName
    pub fn is_invalid_name(&self) -> bool {
        match self {
            DistroliteError::InvalidName(_) => true,
            DistroliteError::Operation { source, .. } => source.is_invalid_name(),
            _ => false,
        }
    }
}

//! distrolite: lifecycle, identity and configuration of named guest Linux
//! environments ("distros") hosted by a platform virtualization manager.
//!
//! The crate exposes one capability surface, [`Backend`], with two
//! implementations: a native variant delegating to the platform's distro
//! manager and a simulated variant running against an in-memory registry
//! store. Everything above the trait, the [`DistroliteRuntime`] entry
//! point and the per-distro [`Distro`] handles, is implementation-agnostic.
//!
//! ```
//! use distrolite::{DistroState, DistroliteRuntime};
//!
//! let runtime = DistroliteRuntime::simulated();
//!
//! let distro = runtime.distro("Ubuntu");
//! distro.register("ubuntu-rootfs.tar.gz")?;
//! assert_eq!(distro.state()?, DistroState::Stopped);
//!
//! distro.set_as_default()?;
//! assert_eq!(runtime.default_distro()?.unwrap().name(), "Ubuntu");
//! # Ok::<(), distrolite::DistroliteError>(())
//! ```

pub mod backend;
pub mod configuration;
pub mod distro;
pub mod errors;
pub mod registry;
pub mod runtime;
pub mod util;

pub use backend::{Backend, CommandRunner, NativeBackend, SimulatedBackend};
pub use configuration::Configuration;
pub use distro::Distro;
pub use distro::state::DistroState;
pub use errors::{DistroliteError, DistroliteResult, ShutdownFailure};
pub use runtime::DistroliteRuntime;
pub use util::init_logging;

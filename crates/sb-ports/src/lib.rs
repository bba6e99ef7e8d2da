//! I/O port access backends for sqrbeep.
//!
//! Every backend implements [`PortIo`]; callers pick one at startup through
//! [`open_backend`] and only ever see `Arc<dyn PortIo>` afterwards.

mod driver;
mod native;
mod recording;
mod traits;

use std::path::Path;
use std::sync::Arc;

pub use driver::{DriverBackedPorts, DEFAULT_DRIVER};
#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub use native::NativePorts;
pub use recording::{PortAccess, RecordingPorts};
pub use traits::{DeviceError, PortIo};

/// Which port backend to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Native on Linux, driver library elsewhere
    #[default]
    Auto,
    /// Kernel-granted port access (`ioperm` + `in`/`out`)
    Native,
    /// InpOut-compatible driver library
    Driver,
}

impl BackendKind {
    /// Resolve `Auto` to the backend for the current platform.
    pub fn resolve(self) -> BackendKind {
        match self {
            BackendKind::Auto if cfg!(target_os = "linux") => BackendKind::Native,
            BackendKind::Auto => BackendKind::Driver,
            other => other,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "auto"),
            BackendKind::Native => write!(f, "native"),
            BackendKind::Driver => write!(f, "driver"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "native" => Ok(BackendKind::Native),
            "driver" => Ok(BackendKind::Driver),
            other => Err(format!("unknown port backend '{}'", other)),
        }
    }
}

/// Open a port backend. Fails before any port is written.
pub fn open_backend(kind: BackendKind, driver_path: &Path) -> Result<Arc<dyn PortIo>, DeviceError> {
    let ports: Arc<dyn PortIo> = match kind.resolve() {
        BackendKind::Driver => Arc::new(DriverBackedPorts::load(driver_path)?),
        _ => native::open()?,
    };
    tracing::debug!(backend = ports.name(), "opened port backend");
    Ok(ports)
}

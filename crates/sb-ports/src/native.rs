//! Kernel-granted port access on Linux/x86.
//!
//! `ioperm` unlocks the timer and system control ports for this process,
//! after which `in`/`out` run directly from user space. Needs root or
//! `CAP_SYS_RAWIO`.

use std::sync::Arc;

use crate::traits::{DeviceError, PortIo};

/// First port unlocked by [`NativePorts::open`] (PIT channel 0).
pub const FIRST_PORT: u16 = 0x40;
/// Last port unlocked by [`NativePorts::open`] (system control port B).
pub const LAST_PORT: u16 = 0x61;

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub(crate) fn open() -> Result<Arc<dyn PortIo>, DeviceError> {
    Ok(Arc::new(NativePorts::open()?))
}

#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
pub(crate) fn open() -> Result<Arc<dyn PortIo>, DeviceError> {
    Err(DeviceError::Unsupported(
        "native port access needs Linux on x86".into(),
    ))
}

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
pub use imp::NativePorts;

#[cfg(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64")))]
mod imp {
    use std::arch::asm;

    use super::{FIRST_PORT, LAST_PORT};
    use crate::traits::{DeviceError, PortIo};

    /// Direct `in`/`out` access to ports granted by `ioperm`.
    #[derive(Debug)]
    pub struct NativePorts {
        first: u16,
        last: u16,
    }

    impl NativePorts {
        /// Unlock ports 0x40-0x61.
        pub fn open() -> Result<Self, DeviceError> {
            Self::open_range(FIRST_PORT, LAST_PORT)
        }

        /// Unlock the inclusive port range `first..=last`.
        pub fn open_range(first: u16, last: u16) -> Result<Self, DeviceError> {
            if last < first || last > 0x3FF {
                return Err(DeviceError::Unsupported(format!(
                    "ioperm cannot grant ports {:#x}-{:#x}",
                    first, last
                )));
            }
            let count = (last - first + 1) as libc::c_ulong;
            // SAFETY: ioperm only changes this process's I/O permission bitmap.
            let rc = unsafe { libc::ioperm(first as libc::c_ulong, count, 1) };
            if rc != 0 {
                let err = std::io::Error::last_os_error();
                return Err(match err.kind() {
                    std::io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied(format!(
                        "ioperm({:#x}, {}): {} (run as root)",
                        first, count, err
                    )),
                    _ => DeviceError::Unsupported(format!("ioperm({:#x}, {}): {}", first, count, err)),
                });
            }
            Ok(Self { first, last })
        }

        fn granted(&self, port: u16) -> bool {
            (self.first..=self.last).contains(&port)
        }
    }

    impl PortIo for NativePorts {
        fn name(&self) -> &'static str {
            "native"
        }

        fn read_byte(&self, port: u16) -> u8 {
            if !self.granted(port) {
                tracing::error!(port, "read from port outside the granted range");
                return 0xFF;
            }
            let value: u8;
            // SAFETY: the port is inside the range unlocked by ioperm.
            unsafe {
                asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
            }
            value
        }

        fn write_byte(&self, port: u16, value: u8) {
            if !self.granted(port) {
                tracing::error!(port, "write to port outside the granted range");
                return;
            }
            // SAFETY: the port is inside the range unlocked by ioperm.
            unsafe {
                asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
            }
        }
    }

    impl Drop for NativePorts {
        fn drop(&mut self) {
            let count = (self.last - self.first + 1) as libc::c_ulong;
            // SAFETY: revokes the permission granted in open_range.
            unsafe {
                libc::ioperm(self.first as libc::c_ulong, count, 0);
            }
        }
    }
}

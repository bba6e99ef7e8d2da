//! Port access through an InpOut-compatible driver library.
//!
//! The library exports `Inp32`, `Out32` and `IsInpOutDriverOpen`; it is kept
//! loaded for as long as the backend lives and unloaded on drop.

use libloading::{Library, Symbol};
use std::path::Path;

use crate::traits::{DeviceError, PortIo};

/// Library name tried when no path is configured.
pub const DEFAULT_DRIVER: &str = if cfg!(windows) {
    "inpoutx64.dll"
} else {
    "libinpout.so"
};

type InpFn = unsafe extern "system" fn(i16) -> i16;
type OutFn = unsafe extern "system" fn(i16, i16);
type IsOpenFn = unsafe extern "system" fn() -> i32;

pub struct DriverBackedPorts {
    inp: InpFn,
    out: OutFn,
    _library: Library,
}

impl DriverBackedPorts {
    /// Load the driver library and check that its kernel driver is open.
    pub fn load(path: &Path) -> Result<Self, DeviceError> {
        // SAFETY: loading runs the library's initializers; the InpOut DLL's
        // initializer only installs and opens its kernel driver.
        let library = unsafe { Library::new(path) }
            .map_err(|e| DeviceError::DriverLoad(format!("{}: {}", path.display(), e)))?;

        // SAFETY: the signatures match the InpOut32/InpOutx64 exports.
        let (inp, out, is_open) = unsafe {
            let inp: Symbol<InpFn> = lookup(&library, b"Inp32\0")?;
            let out: Symbol<OutFn> = lookup(&library, b"Out32\0")?;
            let is_open: Symbol<IsOpenFn> = lookup(&library, b"IsInpOutDriverOpen\0")?;
            (*inp, *out, *is_open)
        };

        // SAFETY: resolved from the library above, which is still loaded.
        if unsafe { is_open() } == 0 {
            return Err(DeviceError::DriverClosed);
        }

        Ok(Self { inp, out, _library: library })
    }
}

unsafe fn lookup<'lib, T>(library: &'lib Library, name: &[u8]) -> Result<Symbol<'lib, T>, DeviceError> {
    library.get(name).map_err(|e| {
        let symbol = String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]).into_owned();
        DeviceError::DriverLoad(format!("missing {}: {}", symbol, e))
    })
}

impl PortIo for DriverBackedPorts {
    fn name(&self) -> &'static str {
        "driver"
    }

    fn read_byte(&self, port: u16) -> u8 {
        // SAFETY: the library stays loaded while self exists.
        unsafe { (self.inp)(port as i16) as u8 }
    }

    fn write_byte(&self, port: u16, value: u8) {
        // SAFETY: the library stays loaded while self exists.
        unsafe { (self.out)(port as i16, value as i16) }
    }
}

//! Port access trait and error types.

/// Error type for opening a port backend.
#[derive(Debug)]
pub enum DeviceError {
    /// Backend not available on this platform
    Unsupported(String),
    /// The OS refused port access (usually needs root)
    PermissionDenied(String),
    /// Driver library missing or lacking an entry point
    DriverLoad(String),
    /// Driver library loaded but its kernel driver is not open
    DriverClosed,
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::Unsupported(msg) => write!(f, "Port access unsupported: {}", msg),
            DeviceError::PermissionDenied(msg) => write!(f, "Port access denied: {}", msg),
            DeviceError::DriverLoad(msg) => write!(f, "Failed to load driver: {}", msg),
            DeviceError::DriverClosed => write!(f, "Failed to open driver"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Byte-wide access to legacy I/O ports.
///
/// Once a backend is open, reads and writes cannot fail.
pub trait PortIo: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    fn read_byte(&self, port: u16) -> u8;

    fn write_byte(&self, port: u16, value: u8);

    /// True if any bit of `mask` is set in the port's current value.
    fn test_bits(&self, port: u16, mask: u8) -> bool {
        self.read_byte(port) & mask != 0
    }

    /// Read-modify-write that sets `mask` and leaves all other bits alone.
    fn set_bits(&self, port: u16, mask: u8) {
        let value = self.read_byte(port);
        self.write_byte(port, value | mask);
    }

    /// Read-modify-write that clears `mask` and leaves all other bits alone.
    fn clear_bits(&self, port: u16, mask: u8) {
        let value = self.read_byte(port);
        self.write_byte(port, value & !mask);
    }
}

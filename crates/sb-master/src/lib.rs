//! Headless controller for sqrbeep.
//!
//! Shared by the CLI and tests: stream conversions, player configuration,
//! playback sessions and the termination hook that keeps the speaker from
//! sticking on when the process is killed.

mod config;
mod session;
pub mod termination;

use std::io::{Read, Write};

pub use config::PlayerConfig;
pub use session::PlaybackSession;

// Re-export common types so callers don't need the lower crates directly.
pub use sb_engine::{CycleWait, PlaybackStats};
pub use sb_formats::{Channel, ConversionStats, FormatError};
pub use sb_ports::{BackendKind, DeviceError, DEFAULT_DRIVER};

/// Why a session or conversion failed.
#[derive(Debug)]
pub enum SessionError {
    Format(FormatError),
    Device(DeviceError),
    Io(String),
    SignalHandler(String),
}

impl SessionError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionError::Io(_) => 1,
            SessionError::Format(_) => 2,
            SessionError::Device(_) => 3,
            SessionError::SignalHandler(_) => 4,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Format(e) => write!(f, "{}", e),
            SessionError::Device(e) => write!(f, "{}", e),
            SessionError::Io(msg) => write!(f, "I/O error: {}", msg),
            SessionError::SignalHandler(msg) => {
                write!(f, "Failed to install termination handler: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<FormatError> for SessionError {
    fn from(e: FormatError) -> Self {
        match e {
            FormatError::Io(msg) => SessionError::Io(msg),
            other => SessionError::Format(other),
        }
    }
}

impl From<DeviceError> for SessionError {
    fn from(e: DeviceError) -> Self {
        SessionError::Device(e)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e.to_string())
    }
}

/// WAV on `input` to SQR on `output`, flushing the output.
pub fn wav_to_sqr(
    input: &mut impl Read,
    output: &mut impl Write,
    channel: Channel,
) -> Result<ConversionStats, SessionError> {
    let stats = sb_formats::wav_to_sqr(input, output, channel)?;
    output.flush()?;
    Ok(stats)
}

/// SQR on `input` to 8-bit mono WAV on `output`, flushing the output.
pub fn sqr_to_wav(
    input: &mut impl Read,
    output: &mut impl Write,
) -> Result<ConversionStats, SessionError> {
    let stats = sb_formats::sqr_to_wav(input, output)?;
    output.flush()?;
    Ok(stats)
}

//! 8254 PIT channel 2 programming.
//!
//! Channel 2 drives the PC speaker. Its 16-bit reload value is loaded through
//! an 8-bit data port, low byte first, after a command byte selects the
//! channel and access mode.

use std::sync::Arc;

use sb_ports::PortIo;

/// PIT base oscillator rate in Hz.
pub const PIT_TICK_RATE: u32 = 1_193_180;

/// Channel 2 data port.
pub const PIT_CHANNEL2_PORT: u16 = 0x42;
/// Mode/command register port.
pub const PIT_COMMAND_PORT: u16 = 0x43;

/// Command byte fields.
pub mod command {
    pub const SELECT_CHANNEL2: u8 = 0b1000_0000;
    pub const ACCESS_LOBYTE_HIBYTE: u8 = 0b0011_0000;
    pub const MODE_SQUARE_WAVE: u8 = 0b0000_0110;
    pub const BINARY: u8 = 0b0000_0000;
}

/// Channel 2, lobyte/hibyte, square wave generator, binary counting (0xB6).
pub const CHANNEL2_SQUARE_WAVE: u8 = command::SELECT_CHANNEL2
    | command::ACCESS_LOBYTE_HIBYTE
    | command::MODE_SQUARE_WAVE
    | command::BINARY;

/// Reload value that makes the PIT cycle at `freq_hz`.
///
/// Rounds to the nearest tick. Frequencies below about 18.2 Hz need more
/// than 16 bits; the value wraps like the hardware register would.
pub fn frequency_to_period(freq_hz: f64) -> u16 {
    (PIT_TICK_RATE as f64 / freq_hz).round() as u32 as u16
}

/// Writes PIT channel 2 configuration. The only writer of that state.
pub struct PitProgrammer {
    ports: Arc<dyn PortIo>,
}

impl PitProgrammer {
    pub fn new(ports: Arc<dyn PortIo>) -> Self {
        Self { ports }
    }

    /// Put channel 2 in square wave mode cycling at `freq_hz`.
    /// Returns the reload value written.
    pub fn configure(&self, freq_hz: f64) -> u16 {
        let period = frequency_to_period(freq_hz);
        self.ports.write_byte(PIT_COMMAND_PORT, CHANNEL2_SQUARE_WAVE);
        self.ports.write_byte(PIT_CHANNEL2_PORT, (period & 0xFF) as u8);
        self.ports.write_byte(PIT_CHANNEL2_PORT, (period >> 8) as u8);
        tracing::debug!(freq_hz, period, "programmed PIT channel 2");
        period
    }
}

//! Fixed-frequency tone on the PC speaker.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sb_ports::PortIo;

use crate::pit::PitProgrammer;
use crate::speaker::{CycleWait, GateBits, GateRelease, SpeakerDriver};

/// Longest sleep between release checks while a tone sounds.
const RELEASE_POLL: Duration = Duration::from_millis(10);

/// Plays a steady square wave from PIT channel 2.
///
/// The timer gate and speaker bit are switched together, so nothing sounds
/// between tones. Dropping the beeper releases both bits.
pub struct Beeper {
    pit: PitProgrammer,
    speaker: SpeakerDriver,
}

impl Beeper {
    pub fn new(ports: Arc<dyn PortIo>) -> Self {
        Self {
            pit: PitProgrammer::new(ports.clone()),
            speaker: SpeakerDriver::new(ports, GateBits::SpeakerAndTimer, CycleWait::default()),
        }
    }

    /// Program the frequency and switch the speaker on. Returns the period.
    pub fn start(&self, freq_hz: f64) -> u16 {
        let period = self.pit.configure(freq_hz);
        self.speaker.enable_gate();
        period
    }

    pub fn stop(&self) {
        self.speaker.disable_gate();
    }

    /// Sound `freq_hz` for `duration`, then go quiet.
    ///
    /// Returns early if released from another thread.
    pub fn beep(&self, freq_hz: f64, duration: Duration) {
        let period = self.start(freq_hz);
        tracing::debug!(freq_hz, period, millis = duration.as_millis() as u64, "beep");
        let deadline = Instant::now() + duration;
        while !self.is_released() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(RELEASE_POLL));
        }
        self.stop();
    }

    pub fn release_handle(&self) -> GateRelease {
        self.speaker.release_handle()
    }

    pub fn is_released(&self) -> bool {
        self.speaker.is_released()
    }
}

impl Drop for Beeper {
    fn drop(&mut self) {
        self.speaker.release();
    }
}

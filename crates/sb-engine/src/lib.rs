//! PC speaker engine for sqrbeep.
//!
//! Programs PIT channel 2, gates the speaker through port 0x61 and plays SQR
//! streams one bit per timer cycle.

pub mod pit;
mod playback;
pub mod speaker;
mod tone;

pub use pit::{frequency_to_period, PitProgrammer, PIT_TICK_RATE};
pub use playback::{PlaybackState, PlaybackStats, Player};
pub use speaker::{CycleWait, GateBits, GateRelease, SpeakerDriver};
pub use tone::Beeper;

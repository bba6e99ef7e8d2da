//! SQR playback through the PC speaker.
//!
//! `Idle` once the header is validated, `Configured` after the PIT is
//! programmed and the timer gate and speaker enabled, `Playing` while bits are being
//! clocked out, back to `Idle` when the stream is exhausted or the driver is
//! released. Leaving `Playing` always turns the speaker off.

use std::io::Read;
use std::sync::Arc;

use sb_formats::{bits_msb_first, FormatError, SqrHeader, SqrReader};
use sb_ports::PortIo;

use crate::pit::PitProgrammer;
use crate::speaker::{CycleWait, GateBits, GateRelease, SpeakerDriver};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Configured,
    Playing,
}

/// What a playback run got through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Data bytes clocked out
    pub bytes_played: u32,
    /// Data bytes the header declared
    pub declared_bytes: u32,
    /// Playback stopped because the driver was released
    pub interrupted: bool,
}

impl PlaybackStats {
    pub fn bits_played(&self) -> u64 {
        self.bytes_played as u64 * 8
    }

    /// The input ended before the declared size.
    pub fn truncated(&self) -> bool {
        !self.interrupted && self.bytes_played < self.declared_bytes
    }
}

/// Plays one SQR stream. One PIT period per bit paces output at the
/// stream's sample rate.
pub struct Player<R> {
    reader: SqrReader<R>,
    pit: PitProgrammer,
    speaker: SpeakerDriver,
    state: PlaybackState,
    stats: PlaybackStats,
}

impl<R: Read> Player<R> {
    /// Validate the SQR header, then configure the hardware.
    ///
    /// A bad header fails before any port is touched.
    pub fn new(input: R, ports: Arc<dyn PortIo>, wait: CycleWait) -> Result<Self, FormatError> {
        let mut player = Self::load(input, ports, wait)?;
        player.configure();
        Ok(player)
    }

    /// Validate the SQR header without touching any port. The player stays
    /// `Idle` until [`configure`](Self::configure).
    pub fn load(input: R, ports: Arc<dyn PortIo>, wait: CycleWait) -> Result<Self, FormatError> {
        let reader = SqrReader::new(input)?;
        let declared_bytes = reader.header().data_size;
        Ok(Self {
            reader,
            pit: PitProgrammer::new(ports.clone()),
            speaker: SpeakerDriver::new(ports, GateBits::SpeakerData, wait),
            state: PlaybackState::Idle,
            stats: PlaybackStats {
                declared_bytes,
                ..PlaybackStats::default()
            },
        })
    }

    /// Program the PIT to the stream's sample rate and open the gate.
    ///
    /// Only an `Idle` player that has not been released is configured.
    pub fn configure(&mut self) {
        if self.state != PlaybackState::Idle || self.speaker.is_released() {
            return;
        }
        self.pit.configure(self.reader.header().sample_rate as f64);
        self.speaker.connect_timer();
        self.speaker.enable_gate();
        self.state = PlaybackState::Configured;
    }

    pub fn header(&self) -> &SqrHeader {
        self.reader.header()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    /// Handle that stops playback and silences the speaker from another thread.
    pub fn release_handle(&self) -> GateRelease {
        self.speaker.release_handle()
    }

    /// Play the rest of the stream, then silence the speaker.
    pub fn play(&mut self) -> Result<PlaybackStats, FormatError> {
        let result = loop {
            match self.play_byte() {
                Ok(true) => continue,
                Ok(false) => break Ok(self.stats),
                Err(e) => break Err(e),
            }
        };
        self.finish();

        let stats = self.stats;
        if stats.truncated() {
            tracing::warn!(
                played = stats.bytes_played,
                declared = stats.declared_bytes,
                "SQR stream ended before its declared data size"
            );
        }
        tracing::info!(
            bytes = stats.bytes_played,
            bits = stats.bits_played(),
            interrupted = stats.interrupted,
            "playback finished"
        );
        result
    }

    /// Clock out the 8 bits of the next data byte, MSB first.
    ///
    /// Returns `false` once playback is over; the speaker is silenced then.
    pub fn play_byte(&mut self) -> Result<bool, FormatError> {
        if self.state == PlaybackState::Idle {
            return Ok(false);
        }
        self.state = PlaybackState::Playing;

        if self.speaker.is_released() {
            self.stats.interrupted = true;
            self.finish();
            return Ok(false);
        }
        let byte = match self.reader.next_byte() {
            Ok(Some(byte)) => byte,
            Ok(None) => {
                self.finish();
                return Ok(false);
            }
            Err(e) => {
                self.finish();
                return Err(e);
            }
        };

        for bit in bits_msb_first(byte) {
            if bit {
                self.speaker.enable_gate();
            } else {
                self.speaker.disable_gate();
            }
            self.speaker.wait_for_cycle();
        }
        self.stats.bytes_played += 1;
        Ok(true)
    }

    fn finish(&mut self) {
        self.speaker.release();
        self.state = PlaybackState::Idle;
    }
}

impl<R> Drop for Player<R> {
    fn drop(&mut self) {
        self.speaker.release();
    }
}

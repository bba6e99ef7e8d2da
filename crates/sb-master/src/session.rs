use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use sb_engine::pit::PIT_CHANNEL2_PORT;
use sb_engine::speaker::{SYSTEM_CONTROL_PORT, TIMER2_OUT_STATUS};
use sb_engine::{Beeper, PlaybackStats, Player};
use sb_ports::{open_backend, PortIo, RecordingPorts};

use crate::config::PlayerConfig;
use crate::{termination, SessionError};

/// Owns an open port backend and plays through it.
///
/// While a tone or stream is sounding, a termination hook is registered so
/// a signal silences the speaker before the process exits.
pub struct PlaybackSession {
    ports: Arc<dyn PortIo>,
    config: PlayerConfig,
    recording: Option<Arc<RecordingPorts>>,
}

impl PlaybackSession {
    /// Open the configured backend. Fails before any port is written.
    pub fn open(config: PlayerConfig) -> Result<Self, SessionError> {
        let ports = open_backend(config.backend, &config.driver_path)?;
        tracing::debug!(backend = ports.name(), wait = %config.wait, "opened playback session");
        Ok(Self { ports, config, recording: None })
    }

    /// Session over simulated ports whose timer outputs free-run, so playback
    /// completes without hardware.
    pub fn dry_run(config: PlayerConfig) -> Self {
        let recording = Arc::new(
            RecordingPorts::unlogged()
                .with_toggling_bits(SYSTEM_CONTROL_PORT, TIMER2_OUT_STATUS)
                .with_toggling_bits(PIT_CHANNEL2_PORT, 0x80),
        );
        tracing::debug!(wait = %config.wait, "opened dry-run session");
        Self {
            ports: recording.clone(),
            config,
            recording: Some(recording),
        }
    }

    /// Session over caller-supplied ports.
    pub fn with_ports(ports: Arc<dyn PortIo>, config: PlayerConfig) -> Self {
        Self { ports, config, recording: None }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.ports.name()
    }

    /// Port accesses made so far, for dry-run sessions.
    pub fn port_accesses(&self) -> Option<u64> {
        self.recording.as_ref().map(|r| r.access_count())
    }

    /// Play an SQR stream to the end. The speaker is off when this returns,
    /// whether it succeeds or not.
    pub fn play(&self, input: impl Read) -> Result<PlaybackStats, SessionError> {
        let mut player = Player::load(input, self.ports.clone(), self.config.wait)?;
        let release = player.release_handle();
        let _hook = termination::register(move || release.release())?;
        player.configure();
        Ok(player.play()?)
    }

    /// Sound a fixed tone for `duration`.
    pub fn beep(&self, freq_hz: f64, duration: Duration) -> Result<(), SessionError> {
        let beeper = Beeper::new(self.ports.clone());
        let release = beeper.release_handle();
        let _hook = termination::register(move || release.release())?;
        beeper.beep(freq_hz, duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_engine::speaker::SPEAKER_DATA;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::MutexGuard;

    /// Records whether the speaker bit was ever set with no hook registered.
    struct HookCheckingPorts {
        inner: RecordingPorts,
        opened_unguarded: AtomicBool,
        opened: AtomicBool,
    }

    impl HookCheckingPorts {
        fn new() -> Self {
            Self {
                inner: RecordingPorts::new().with_toggling_bits(SYSTEM_CONTROL_PORT, TIMER2_OUT_STATUS),
                opened_unguarded: AtomicBool::new(false),
                opened: AtomicBool::new(false),
            }
        }
    }

    impl PortIo for HookCheckingPorts {
        fn name(&self) -> &'static str {
            "hook-checking"
        }

        fn read_byte(&self, port: u16) -> u8 {
            self.inner.read_byte(port)
        }

        fn write_byte(&self, port: u16, value: u8) {
            if port == SYSTEM_CONTROL_PORT && value & SPEAKER_DATA != 0 {
                self.opened.store(true, Ordering::SeqCst);
                if termination::registered_count() == 0 {
                    self.opened_unguarded.store(true, Ordering::SeqCst);
                }
            }
            self.inner.write_byte(port, value);
        }
    }

    fn serial() -> MutexGuard<'static, ()> {
        termination::TEST_SERIAL
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn make_sqr(data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend(b"SQR\0");
        buf.extend(&8000u32.to_le_bytes());
        buf.extend(&(data.len() as u32).to_le_bytes());
        buf.extend(data);
        buf
    }

    #[test]
    fn play_registers_hook_before_opening_gate() {
        let _serial = serial();
        let ports = Arc::new(HookCheckingPorts::new());
        let session = PlaybackSession::with_ports(ports.clone(), PlayerConfig::default());
        session.play(&make_sqr(&[0xFF])[..]).unwrap();
        assert!(ports.opened.load(Ordering::SeqCst));
        assert!(!ports.opened_unguarded.load(Ordering::SeqCst));
        assert_eq!(termination::registered_count(), 0);
    }

    #[test]
    fn beep_registers_hook_before_opening_gate() {
        let _serial = serial();
        let ports = Arc::new(HookCheckingPorts::new());
        let session = PlaybackSession::with_ports(ports.clone(), PlayerConfig::default());
        session.beep(1000.0, Duration::from_millis(1)).unwrap();
        assert!(ports.opened.load(Ordering::SeqCst));
        assert!(!ports.opened_unguarded.load(Ordering::SeqCst));
    }

    #[test]
    fn dry_run_counts_accesses() {
        let _serial = serial();
        let session = PlaybackSession::dry_run(PlayerConfig::default());
        assert_eq!(session.backend_name(), "recording");
        let stats = session.play(&make_sqr(&[0xA5, 0x5A])[..]).unwrap();
        assert_eq!(stats.bytes_played, 2);
        assert!(session.port_accesses().unwrap() > 16);
    }

    #[test]
    fn bad_stream_is_format_error_without_port_access() {
        let session = PlaybackSession::dry_run(PlayerConfig::default());
        let err = session.play(&b"RIFF\0\0\0\0WAVE"[..]).unwrap_err();
        assert!(matches!(err, SessionError::Format(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(session.port_accesses(), Some(0));
    }

    #[test]
    fn supplied_ports_have_no_access_count() {
        let _serial = serial();
        let ports = Arc::new(RecordingPorts::new());
        let session = PlaybackSession::with_ports(ports.clone(), PlayerConfig::default());
        session.beep(1000.0, Duration::from_millis(1)).unwrap();
        assert_eq!(session.port_accesses(), None);
        assert_eq!(ports.register(SYSTEM_CONTROL_PORT) & 0b11, 0);
    }
}

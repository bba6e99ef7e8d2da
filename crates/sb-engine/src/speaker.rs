//! PC speaker gate control through system control port B (0x61).
//!
//! Bit 0 gates PIT channel 2, bit 1 connects the speaker, bit 5 reads back
//! the channel 2 output. The remaining bits control unrelated hardware, so
//! every change is a read-modify-write of the gate bits only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sb_ports::PortIo;

use crate::pit::PIT_CHANNEL2_PORT;

/// System control port B (keyboard controller / NMI status and control).
pub const SYSTEM_CONTROL_PORT: u16 = 0x61;
/// Timer 2 gate.
pub const TIMER2_GATE: u8 = 0b0000_0001;
/// Speaker data enable.
pub const SPEAKER_DATA: u8 = 0b0000_0010;
/// Timer 2 output status (read-only).
pub const TIMER2_OUT_STATUS: u8 = 0b0010_0000;

/// Channel 2 readback value the legacy wait spins below.
pub const COUNTER_THRESHOLD: u8 = 127;

/// Which bits `enable_gate`/`disable_gate` touch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateBits {
    /// Speaker data bit only; the timer gate is managed separately
    #[default]
    SpeakerData,
    /// Speaker data and timer gate together
    SpeakerAndTimer,
}

impl GateBits {
    pub const fn mask(self) -> u8 {
        match self {
            GateBits::SpeakerData => SPEAKER_DATA,
            GateBits::SpeakerAndTimer => SPEAKER_DATA | TIMER2_GATE,
        }
    }
}

/// How `wait_for_cycle` detects the end of a PIT period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CycleWait {
    /// Wait for a full low-to-high transition of the timer 2 output status bit
    #[default]
    StatusBit,
    /// Spin while the raw channel 2 readback is below 127
    CounterThreshold,
}

impl std::fmt::Display for CycleWait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleWait::StatusBit => write!(f, "status-bit"),
            CycleWait::CounterThreshold => write!(f, "counter-threshold"),
        }
    }
}

impl std::str::FromStr for CycleWait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status-bit" => Ok(CycleWait::StatusBit),
            "counter-threshold" => Ok(CycleWait::CounterThreshold),
            other => Err(format!("unknown cycle wait '{}'", other)),
        }
    }
}

struct Shared {
    ports: Arc<dyn PortIo>,
    // Serializes gate read-modify-writes with a release from another thread.
    gate_lock: Mutex<()>,
    released: AtomicBool,
}

impl Shared {
    fn release(&self) {
        let _guard = self.gate_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Enables are ignored once released, so the bits are still clear.
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.ports.clear_bits(SYSTEM_CONTROL_PORT, TIMER2_GATE | SPEAKER_DATA);
    }
}

/// Drives the speaker gate and paces playback off the PIT.
///
/// Once released, the driver ignores further enables and any pending wait
/// returns, so the speaker stays off.
pub struct SpeakerDriver {
    shared: Arc<Shared>,
    gate: GateBits,
    wait: CycleWait,
}

impl SpeakerDriver {
    pub fn new(ports: Arc<dyn PortIo>, gate: GateBits, wait: CycleWait) -> Self {
        Self {
            shared: Arc::new(Shared {
                ports,
                gate_lock: Mutex::new(()),
                released: AtomicBool::new(false),
            }),
            gate,
            wait,
        }
    }

    /// Let PIT channel 2 count (sets bit 0).
    pub fn connect_timer(&self) {
        self.update(|ports| ports.set_bits(SYSTEM_CONTROL_PORT, TIMER2_GATE));
    }

    /// Speaker on.
    pub fn enable_gate(&self) {
        let mask = self.gate.mask();
        self.update(|ports| ports.set_bits(SYSTEM_CONTROL_PORT, mask));
    }

    /// Speaker off.
    pub fn disable_gate(&self) {
        let mask = self.gate.mask();
        self.update(|ports| ports.clear_bits(SYSTEM_CONTROL_PORT, mask));
    }

    /// Block until the PIT completes its current period.
    pub fn wait_for_cycle(&self) {
        let ports = &*self.shared.ports;
        match self.wait {
            CycleWait::StatusBit => {
                while ports.test_bits(SYSTEM_CONTROL_PORT, TIMER2_OUT_STATUS) {
                    if self.is_released() {
                        return;
                    }
                    std::hint::spin_loop();
                }
                while !ports.test_bits(SYSTEM_CONTROL_PORT, TIMER2_OUT_STATUS) {
                    if self.is_released() {
                        return;
                    }
                    std::hint::spin_loop();
                }
            }
            CycleWait::CounterThreshold => {
                while ports.read_byte(PIT_CHANNEL2_PORT) < COUNTER_THRESHOLD {
                    if self.is_released() {
                        return;
                    }
                    std::hint::spin_loop();
                }
            }
        }
    }

    /// Clear both gate bits and latch the driver off.
    pub fn release(&self) {
        self.shared.release();
    }

    pub fn is_released(&self) -> bool {
        self.shared.released.load(Ordering::SeqCst)
    }

    /// Handle that can release this driver from another thread.
    pub fn release_handle(&self) -> GateRelease {
        GateRelease { shared: self.shared.clone() }
    }

    fn update(&self, change: impl FnOnce(&dyn PortIo)) {
        let _guard = self.shared.gate_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.shared.released.load(Ordering::SeqCst) {
            return;
        }
        change(&*self.shared.ports);
    }
}

/// Cloneable, thread-safe handle that forces the speaker off.
#[derive(Clone)]
pub struct GateRelease {
    shared: Arc<Shared>,
}

impl GateRelease {
    pub fn release(&self) {
        self.shared.release();
    }
}

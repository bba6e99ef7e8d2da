//! In-memory port backend for tests and dry runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::traits::PortIo;

/// One logged port access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortAccess {
    Read { port: u16, value: u8 },
    Write { port: u16, value: u8 },
}

#[derive(Default)]
struct State {
    registers: BTreeMap<u16, u8>,
    toggles: BTreeMap<u16, u8>,
    log: Vec<PortAccess>,
    logging: bool,
    accesses: u64,
}

/// Simulated register file that records every access.
///
/// Registers read as 0 until written. A port configured with
/// [`with_toggling_bits`](Self::with_toggling_bits) flips those bits after
/// every read, which stands in for a free-running timer output.
pub struct RecordingPorts {
    state: Mutex<State>,
}

impl RecordingPorts {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                logging: true,
                ..State::default()
            }),
        }
    }

    /// Count accesses without keeping the log.
    pub fn unlogged() -> Self {
        Self { state: Mutex::new(State::default()) }
    }

    /// Preset a register value.
    pub fn with_register(self, port: u16, value: u8) -> Self {
        self.lock().registers.insert(port, value);
        self
    }

    /// Flip `mask` in `port` after each read of it.
    pub fn with_toggling_bits(self, port: u16, mask: u8) -> Self {
        self.lock().toggles.insert(port, mask);
        self
    }

    /// Current value of a register.
    pub fn register(&self, port: u16) -> u8 {
        self.lock().registers.get(&port).copied().unwrap_or(0)
    }

    /// Copy of the access log.
    pub fn log(&self) -> Vec<PortAccess> {
        self.lock().log.clone()
    }

    /// Values written to one port, in order.
    pub fn writes_to(&self, port: u16) -> Vec<u8> {
        self.lock()
            .log
            .iter()
            .filter_map(|access| match *access {
                PortAccess::Write { port: p, value } if p == port => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Total reads and writes, logged or not.
    pub fn access_count(&self) -> u64 {
        self.lock().accesses
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RecordingPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl PortIo for RecordingPorts {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn read_byte(&self, port: u16) -> u8 {
        let mut state = self.lock();
        let value = state.registers.get(&port).copied().unwrap_or(0);
        if let Some(&mask) = state.toggles.get(&port) {
            state.registers.insert(port, value ^ mask);
        }
        state.accesses += 1;
        if state.logging {
            state.log.push(PortAccess::Read { port, value });
        }
        value
    }

    fn write_byte(&self, port: u16, value: u8) {
        let mut state = self.lock();
        state.registers.insert(port, value);
        state.accesses += 1;
        if state.logging {
            state.log.push(PortAccess::Write { port, value });
        }
    }
}

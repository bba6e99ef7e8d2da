//! Allocation-free playback path tests.
//!
//! The per-bit loop (gate toggle, cycle wait, next byte) runs at the stream's
//! sample rate, so `Player::play_byte()` must not touch the heap.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use sb_engine::{CycleWait, PlaybackState, Player};
use sb_ports::PortIo;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Port stub with free-running timer outputs and no bookkeeping.
#[derive(Default)]
struct TimerStub {
    control: AtomicU8,
    channel2: AtomicU8,
}

impl PortIo for TimerStub {
    fn name(&self) -> &'static str {
        "timer-stub"
    }

    fn read_byte(&self, port: u16) -> u8 {
        match port {
            0x61 => self.control.fetch_xor(0x20, Ordering::Relaxed),
            0x42 => self.channel2.fetch_xor(0x80, Ordering::Relaxed),
            _ => 0,
        }
    }

    fn write_byte(&self, port: u16, value: u8) {
        match port {
            0x61 => self.control.store(value, Ordering::Relaxed),
            0x42 => self.channel2.store(value, Ordering::Relaxed),
            _ => {}
        }
    }
}

fn noise_sqr(data_size: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(b"SQR\0");
    buf.extend(&44100u32.to_le_bytes());
    buf.extend(&data_size.to_le_bytes());
    let mut seed = 0x1234_5678u32;
    for _ in 0..data_size {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        buf.push((seed >> 24) as u8);
    }
    buf
}

/// Play a whole stream, aborting on any heap allocation.
fn assert_playback_alloc_free(wait: CycleWait, data_size: u32) {
    let sqr = noise_sqr(data_size);
    let ports = Arc::new(TimerStub::default());
    let mut player = Player::new(&sqr[..], ports.clone(), wait).unwrap();

    let mut played = 0u32;
    assert_no_alloc(|| {
        while player.play_byte().unwrap() {
            played += 1;
        }
    });

    assert_eq!(played, data_size);
    assert_eq!(player.state(), PlaybackState::Idle);
    assert_eq!(ports.control.load(Ordering::Relaxed) & 0b11, 0);
}

#[test]
fn status_bit_playback_alloc_free() {
    assert_playback_alloc_free(CycleWait::StatusBit, 44100 / 8);
}

#[test]
fn counter_threshold_playback_alloc_free() {
    assert_playback_alloc_free(CycleWait::CounterThreshold, 44100 / 8);
}

//! Bit packing for the SQR data section (8 bits per byte, MSB first).

/// Packs single bits into bytes, most-significant bit first.
///
/// The buffer is cleared after every full byte, so a partially filled byte
/// always has its unused low bits at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitAccumulator {
    byte: u8,
    index: u8,
}

impl BitAccumulator {
    pub const fn new() -> Self {
        Self { byte: 0, index: 0 }
    }

    /// Push one bit. Returns the completed byte on every 8th push.
    pub fn push(&mut self, bit: bool) -> Option<u8> {
        self.byte |= (bit as u8) << (7 - self.index);
        self.index += 1;
        if self.index == 8 {
            let full = self.byte;
            self.byte = 0;
            self.index = 0;
            Some(full)
        } else {
            None
        }
    }

    /// Number of bits waiting in the current byte (0-7).
    pub fn pending(&self) -> u8 {
        self.index
    }

    /// Take the partially filled byte, zero-padded, if any bits are pending.
    pub fn flush(&mut self) -> Option<u8> {
        if self.index == 0 {
            return None;
        }
        let partial = self.byte;
        self.byte = 0;
        self.index = 0;
        Some(partial)
    }
}

/// Iterate the 8 bits of a packed byte, most-significant first.
pub fn bits_msb_first(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).rev().map(move |i| (byte >> i) & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_msb_first() {
        let mut acc = BitAccumulator::new();
        let bits = [true, false, false, false, false, false, false, true];
        let mut out = None;
        for bit in bits {
            out = acc.push(bit);
        }
        assert_eq!(out, Some(0b1000_0001));
        assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn resets_after_full_byte() {
        let mut acc = BitAccumulator::new();
        for _ in 0..8 {
            acc.push(true);
        }
        acc.push(false);
        acc.push(true);
        assert_eq!(acc.flush(), Some(0b0100_0000));
    }

    #[test]
    fn flush_on_empty_is_none() {
        let mut acc = BitAccumulator::new();
        assert_eq!(acc.flush(), None);
    }

    #[test]
    fn unpacks_msb_first() {
        let bits: Vec<bool> = bits_msb_first(0b1010_0001).collect();
        assert_eq!(bits, [true, false, true, false, false, false, false, true]);
    }
}

//! One-bit threshold quantizer and its full-scale inverse.

/// Quantize one raw little-endian PCM sample to a single bit.
///
/// 8-bit samples are unsigned, so the threshold is 128 and the bit is the
/// sample's MSB. Wider samples are signed with a threshold of 0, so the bit
/// is the inverted sign bit of the most-significant (last) byte. Lower bytes
/// never affect the result.
pub fn sample_to_bit(raw: &[u8]) -> bool {
    match raw {
        [] => false,
        [only] => only & 0x80 != 0,
        [.., msb] => msb & 0x80 == 0,
    }
}

/// Expand one bit to a full-scale unsigned 8-bit PCM sample.
pub const fn bit_to_pcm(bit: bool) -> u8 {
    if bit {
        0xFF
    } else {
        0x00
    }
}

/// Integer division rounding up. `b` must be non-zero.
pub const fn ceiling_divide(a: u32, b: u32) -> u32 {
    a.div_ceil(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_8bit_threshold_is_128() {
        assert!(!sample_to_bit(&[0x00]));
        assert!(!sample_to_bit(&[0x7F]));
        assert!(sample_to_bit(&[0x80]));
        assert!(sample_to_bit(&[0xFF]));
    }

    #[test]
    fn signed_16bit_threshold_is_zero() {
        let bits: Vec<bool> = [-1i16, 0, 1, -32768, 32767]
            .iter()
            .map(|v| sample_to_bit(&v.to_le_bytes()))
            .collect();
        assert_eq!(bits, [false, true, true, false, true]);
    }

    #[test]
    fn only_top_byte_decides() {
        // 0x00FF as little-endian: low byte has its top bit set, high byte does not
        assert!(sample_to_bit(&[0xFF, 0x00]));
        assert!(!sample_to_bit(&[0x00, 0x80]));
    }

    #[test]
    fn signed_24bit_uses_last_byte() {
        assert!(sample_to_bit(&[0xFF, 0xFF, 0x7F]));
        assert!(!sample_to_bit(&[0x00, 0x00, 0x80]));
    }

    #[test]
    fn pcm_expansion_is_full_scale() {
        assert_eq!(bit_to_pcm(true), 0xFF);
        assert_eq!(bit_to_pcm(false), 0x00);
        assert!(sample_to_bit(&[bit_to_pcm(true)]));
        assert!(!sample_to_bit(&[bit_to_pcm(false)]));
    }

    #[test]
    fn ceiling_divide_matches_closed_form() {
        assert_eq!(ceiling_divide(1, 1), 1);
        for a in 1..200u32 {
            for b in 1..20u32 {
                assert_eq!(ceiling_divide(a, b), (a + b - 1) / b, "a={} b={}", a, b);
            }
        }
    }
}

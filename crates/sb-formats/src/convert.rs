//! Whole-stream WAV <-> SQR conversion.

use std::io::{Read, Write};

use crate::bits::{bits_msb_first, BitAccumulator};
use crate::sqr_format::{SqrHeader, SqrReader};
use crate::threshold::{bit_to_pcm, sample_to_bit};
use crate::wav_format::{read_wav_header, write_mono8_header};
use crate::{read_up_to, FormatError};

/// Which channel of an interleaved multi-channel WAV is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Channel {
    #[default]
    Left,
    Right,
}

impl Channel {
    /// Whether the first sample of the stream is kept.
    fn keeps_first(self) -> bool {
        matches!(self, Channel::Left)
    }
}

/// Counters reported by a conversion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Samples consumed from the input
    pub samples_in: u64,
    /// Samples emitted to the output
    pub samples_out: u64,
    /// Data bytes written after the header
    pub bytes_out: u64,
}

/// Convert a WAV stream to SQR.
///
/// Every sample up to end of input is quantized to one bit. For
/// multi-channel input a keep/skip toggle flips on every sample read, so only
/// every other sample (one channel of a stereo pair) contributes. A trailing
/// partial byte is written with its unused low bits zero.
pub fn wav_to_sqr(
    input: &mut impl Read,
    output: &mut impl Write,
    channel: Channel,
) -> Result<ConversionStats, FormatError> {
    let wav = read_wav_header(input)?;
    let width = wav.sample_width()?;
    let data_size = wav.sqr_data_size()?;
    SqrHeader::new(wav.sample_rate, data_size).write_to(output)?;

    let mono = wav.num_channels == 1;
    let mut keep = channel.keeps_first();
    let mut sample = vec![0u8; width];
    let mut acc = BitAccumulator::new();
    let mut stats = ConversionStats::default();

    while read_up_to(input, &mut sample)? == width {
        stats.samples_in += 1;
        if mono || keep {
            stats.samples_out += 1;
            if let Some(byte) = acc.push(sample_to_bit(&sample)) {
                output.write_all(&[byte])?;
                stats.bytes_out += 1;
            }
        }
        keep = !keep;
    }
    if let Some(byte) = acc.flush() {
        output.write_all(&[byte])?;
        stats.bytes_out += 1;
    }

    if stats.bytes_out != data_size as u64 {
        tracing::debug!(
            declared = data_size,
            written = stats.bytes_out,
            "SQR data size differs from bytes written"
        );
    }
    tracing::info!(
        samples_in = stats.samples_in,
        bits = stats.samples_out,
        bytes = stats.bytes_out,
        "converted WAV to SQR"
    );
    Ok(stats)
}

/// Convert an SQR stream to an 8-bit mono WAV of full-scale square samples.
///
/// Reads at most the declared `data_size` bytes; a shorter input produces a
/// shorter data section without error.
pub fn sqr_to_wav(
    input: &mut impl Read,
    output: &mut impl Write,
) -> Result<ConversionStats, FormatError> {
    let mut reader = SqrReader::new(input)?;
    let header = *reader.header();
    let pcm_size = header
        .data_size
        .checked_mul(8)
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            FormatError::UnsupportedLayout(format!(
                "{} SQR bytes do not fit in a WAV",
                header.data_size
            ))
        })?;
    write_mono8_header(output, header.sample_rate, pcm_size)?;

    let mut stats = ConversionStats::default();
    while let Some(byte) = reader.next_byte()? {
        let mut pcm = [0u8; 8];
        for (slot, bit) in pcm.iter_mut().zip(bits_msb_first(byte)) {
            *slot = bit_to_pcm(bit);
        }
        output.write_all(&pcm)?;
        stats.samples_in += 8;
        stats.samples_out += 8;
        stats.bytes_out += 8;
    }

    if reader.is_truncated() {
        tracing::warn!(
            declared = header.data_size,
            read = reader.bytes_read(),
            "SQR input ended before its declared data size"
        );
    }
    tracing::info!(samples = stats.samples_out, "converted SQR to WAV");
    Ok(stats)
}

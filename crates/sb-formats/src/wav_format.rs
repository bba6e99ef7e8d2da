//! Canonical WAV header reading and 8-bit mono header writing.
//!
//! This is a fixed-offset reader: the `fmt ` chunk is assumed to be the
//! plain 16-byte PCM form, immediately followed by the `data` chunk header,
//! so sample data always starts at byte 44. Extended `fmt ` chunks and
//! intermediate chunks are not walked.

use binrw::BinRead;
use std::io::{Cursor, Read, Write};

use crate::threshold::ceiling_divide;
use crate::{read_up_to, FormatError};

/// Size of the canonical header; sample data starts at this offset.
pub const WAV_HEADER_LEN: usize = 44;

// --- Reading ---

#[derive(BinRead, Clone, Copy, Debug, PartialEq, Eq)]
#[br(little, magic = b"RIFF")]
pub struct WavHeader {
    pub riff_size: u32,
    #[br(magic = b"WAVE")]
    pub fmt_id: [u8; 4],
    pub fmt_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_id: [u8; 4],
    pub data_size: u32,
}

impl WavHeader {
    /// Bytes per sample of one channel.
    pub fn sample_width(&self) -> Result<usize, FormatError> {
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(FormatError::UnsupportedLayout(format!(
                "{} bits per sample",
                self.bits_per_sample
            )));
        }
        Ok(self.bits_per_sample as usize / 8)
    }

    /// `data_size` for the SQR file produced from this WAV.
    ///
    /// Divides the data byte count by bits per sample, then by the channel
    /// count, rounding up after each step.
    pub fn sqr_data_size(&self) -> Result<u32, FormatError> {
        self.sample_width()?;
        if self.num_channels == 0 {
            return Err(FormatError::UnsupportedLayout("zero channels".into()));
        }
        let per_sample = ceiling_divide(self.data_size, self.bits_per_sample as u32);
        Ok(ceiling_divide(per_sample, self.num_channels as u32))
    }
}

/// Read and validate a WAV header, leaving `r` at the first data byte.
pub fn read_wav_header(r: &mut impl Read) -> Result<WavHeader, FormatError> {
    let mut buf = [0u8; WAV_HEADER_LEN];
    let n = read_up_to(r, &mut buf[..12])?;
    if n < 12 || &buf[0..4] != b"RIFF" || &buf[8..12] != b"WAVE" {
        return Err(FormatError::InvalidHeader("not a WAV file"));
    }
    r.read_exact(&mut buf[12..])?;

    let header = WavHeader::read(&mut Cursor::new(&buf[..]))?;
    tracing::debug!(
        channels = header.num_channels,
        sample_rate = header.sample_rate,
        bits = header.bits_per_sample,
        data_size = header.data_size,
        "parsed WAV header"
    );
    Ok(header)
}

// --- Writing ---

/// Write a canonical header for 8-bit mono PCM.
pub fn write_mono8_header(w: &mut impl Write, sample_rate: u32, data_size: u32) -> std::io::Result<()> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 8;
    let block_align = num_channels * (bits_per_sample / 8);

    write_riff_header(w, data_size)?;
    write_fmt_chunk(w, num_channels, sample_rate, block_align, bits_per_sample)?;
    w.write_all(b"data")?;
    w.write_all(&data_size.to_le_bytes())
}

fn write_riff_header(w: &mut impl Write, data_size: u32) -> std::io::Result<()> {
    w.write_all(b"RIFF")?;
    w.write_all(&36u32.wrapping_add(data_size).to_le_bytes())?;
    w.write_all(b"WAVE")
}

fn write_fmt_chunk(
    w: &mut impl Write,
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
) -> std::io::Result<()> {
    w.write_all(b"fmt ")?;
    w.write_all(&16u32.to_le_bytes())?;
    w.write_all(&1u16.to_le_bytes())?;
    w.write_all(&num_channels.to_le_bytes())?;
    w.write_all(&sample_rate.to_le_bytes())?;
    w.write_all(&sample_rate.wrapping_mul(block_align as u32).to_le_bytes())?;
    w.write_all(&block_align.to_le_bytes())?;
    w.write_all(&bits_per_sample.to_le_bytes())
}

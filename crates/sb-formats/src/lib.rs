//! Format codecs for sqrbeep.
//!
//! Reads canonical WAV headers, reads and writes the 1-bit SQR container,
//! and converts between the two with a one-bit threshold quantizer.

mod bits;
mod convert;
mod sqr_format;
mod threshold;
mod wav_format;

use std::io::Read;

pub use bits::{BitAccumulator, bits_msb_first};
pub use convert::{sqr_to_wav, wav_to_sqr, Channel, ConversionStats};
pub use sqr_format::{SqrHeader, SqrReader, SQR_HEADER_LEN, SQR_MAGIC};
pub use threshold::{bit_to_pcm, ceiling_divide, sample_to_bit};
pub use wav_format::{read_wav_header, write_mono8_header, WavHeader, WAV_HEADER_LEN};

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader(&'static str),
    /// Input ended inside a fixed-size header
    UnexpectedEof,
    /// Header values this codec cannot convert
    UnsupportedLayout(String),
    /// I/O error
    Io(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidHeader(what) => write!(f, "Invalid header: {}", what),
            FormatError::UnexpectedEof => write!(f, "Unexpected end of input in header"),
            FormatError::UnsupportedLayout(msg) => write!(f, "Unsupported layout: {}", msg),
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEof
        } else {
            FormatError::Io(e.to_string())
        }
    }
}

impl From<binrw::Error> for FormatError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(io) => io.into(),
            binrw::Error::Backtrace(bt) => (*bt.error).into(),
            other => FormatError::Io(other.to_string()),
        }
    }
}

/// Fill as much of `buf` as the stream provides. Returns the byte count.
///
/// Short reads are retried; fewer bytes than `buf.len()` means end of input.
pub(crate) fn read_up_to(r: &mut impl Read, buf: &mut [u8]) -> Result<usize, FormatError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

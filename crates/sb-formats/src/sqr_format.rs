//! SQR container: a 12-byte header followed by 1-bit samples packed MSB first.
//!
//! | Offset | Field       | Type                         |
//! |--------|-------------|------------------------------|
//! | 0      | magic       | `SQR\0`                      |
//! | 4      | sample_rate | u32 LE                       |
//! | 8      | data_size   | u32 LE, count of data bytes  |
//! | 12     | data        | `data_size` bytes            |

use binrw::{binrw, BinRead, BinWrite};
use std::io::{Cursor, Read, Write};

use crate::{read_up_to, FormatError};

pub const SQR_MAGIC: [u8; 4] = *b"SQR\0";
pub const SQR_HEADER_LEN: usize = 12;

#[binrw]
#[brw(little, magic = b"SQR\0")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SqrHeader {
    /// Samples (bits) per second.
    pub sample_rate: u32,
    /// Number of data bytes; the bit count is 8 times this.
    pub data_size: u32,
}

impl SqrHeader {
    pub fn new(sample_rate: u32, data_size: u32) -> Self {
        Self { sample_rate, data_size }
    }

    /// Read a header. The magic is checked before any other field is read.
    pub fn read_from(r: &mut impl Read) -> Result<Self, FormatError> {
        let mut buf = [0u8; SQR_HEADER_LEN];
        let n = read_up_to(r, &mut buf[..4])?;
        if n < 4 || buf[..4] != SQR_MAGIC {
            return Err(FormatError::InvalidHeader("not a SQR file"));
        }
        r.read_exact(&mut buf[4..])?;
        Ok(Self::read(&mut Cursor::new(&buf[..]))?)
    }

    pub fn write_to(&self, w: &mut impl Write) -> Result<(), FormatError> {
        let mut buf = Cursor::new(Vec::with_capacity(SQR_HEADER_LEN));
        self.write(&mut buf)?;
        w.write_all(buf.get_ref())?;
        Ok(())
    }

    /// Number of 1-bit samples the data section holds.
    pub fn bit_count(&self) -> u64 {
        self.data_size as u64 * 8
    }
}

/// Streaming reader over an SQR file.
///
/// Yields at most `data_size` data bytes. A stream that ends early simply
/// yields fewer bytes; that is not an error.
pub struct SqrReader<R> {
    inner: R,
    header: SqrHeader,
    bytes_read: u32,
}

impl<R: Read> SqrReader<R> {
    /// Validate the header and position the reader at the first data byte.
    pub fn new(mut inner: R) -> Result<Self, FormatError> {
        let header = SqrHeader::read_from(&mut inner)?;
        tracing::debug!(
            sample_rate = header.sample_rate,
            data_size = header.data_size,
            "parsed SQR header"
        );
        Ok(Self { inner, header, bytes_read: 0 })
    }

    pub fn header(&self) -> &SqrHeader {
        &self.header
    }

    /// Data bytes consumed so far.
    pub fn bytes_read(&self) -> u32 {
        self.bytes_read
    }

    /// Next packed data byte, or `None` once `data_size` bytes were read or
    /// the input ran out.
    pub fn next_byte(&mut self) -> Result<Option<u8>, FormatError> {
        if self.bytes_read >= self.header.data_size {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        if read_up_to(&mut self.inner, &mut byte)? == 0 {
            return Ok(None);
        }
        self.bytes_read += 1;
        Ok(Some(byte[0]))
    }

    /// True when the input ended before the declared data size.
    pub fn is_truncated(&self) -> bool {
        self.bytes_read < self.header.data_size
    }
}

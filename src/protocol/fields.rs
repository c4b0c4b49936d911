//! Dataset field codec
//!
//! Fixed-width integers are little-endian throughout. Strings are stored as a
//! one-byte count of UTF-16 code units (terminator included) followed by the
//! units themselves:
//!
//! ```text
//! ""    -> 00
//! "AB"  -> 03 41 00 42 00 00 00
//! ```
//!
//! Dates are `YYYYMMDDThhmmss` strings encoded as above.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDateTime;

use super::{Error, Result};

/// Maximum string length in UTF-16 code units, excluding the terminator.
///
/// The count byte includes the terminator, so 254 units is the longest
/// string whose count still fits in one byte.
pub const MAX_STRING_UNITS: usize = 254;

/// Number of characters in an encoded date
pub const DATE_LENGTH: usize = 15;

/// `chrono` format of an encoded date
pub const DATE_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Encoded size of a date field: count byte plus 16 UTF-16 units
pub const DATE_FIELD_LEN: usize = 1 + (DATE_LENGTH + 1) * 2;

/// Encoded size of a string field, or an error if it is too long
pub fn string_field_len(value: &str) -> Result<usize> {
    let units = value.encode_utf16().count();
    if units > MAX_STRING_UNITS {
        return Err(Error::StringTooLong { len: units });
    }
    if units == 0 {
        Ok(1)
    } else {
        Ok(1 + (units + 1) * 2)
    }
}

/// Encode a string field
pub fn encode_string(value: &str) -> Result<Vec<u8>> {
    let mut writer = DatasetWriter::with_capacity(string_field_len(value)?);
    writer.put_string(value)?;
    Ok(writer.finish().to_vec())
}

/// Decode a string field at `offset`
///
/// Returns the string (`None` for the absent/empty form) and the offset just
/// past the field.
pub fn decode_string(bytes: &[u8], offset: usize) -> Result<(Option<String>, usize)> {
    let mut reader = DatasetReader::at(bytes, offset);
    let text = reader.read_string()?;
    Ok((text, reader.offset()))
}

/// Format a date as the 15-character `YYYYMMDDThhmmss` form
#[must_use]
pub fn format_date(date: &NaiveDateTime) -> String {
    let mut text = date.format(DATE_FORMAT).to_string();
    // five-digit years would push the string past 15 characters
    text.truncate(DATE_LENGTH);
    text
}

/// Encode a date field
#[must_use]
pub fn encode_date(date: &NaiveDateTime) -> Vec<u8> {
    let mut writer = DatasetWriter::with_capacity(DATE_FIELD_LEN);
    writer.put_date(date);
    writer.finish().to_vec()
}

/// Decode a date field at `offset`
///
/// An absent string or one that does not parse yields `None`; the offset
/// still advances past the field.
pub fn decode_date(bytes: &[u8], offset: usize) -> Result<(Option<NaiveDateTime>, usize)> {
    let mut reader = DatasetReader::at(bytes, offset);
    let date = reader.read_date()?;
    Ok((date, reader.offset()))
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let prefix = text.get(..DATE_LENGTH)?;
    NaiveDateTime::parse_from_str(prefix, DATE_FORMAT).ok()
}

/// Sequential little-endian writer for datasets
#[derive(Debug, Default)]
pub struct DatasetWriter {
    buf: BytesMut,
}

impl DatasetWriter {
    /// Create a writer with room for `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a u16
    pub fn put_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    /// Append a u32
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Append a u64
    pub fn put_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    /// Append `count` zero bytes
    pub fn put_reserved(&mut self, count: usize) {
        self.buf.put_bytes(0, count);
    }

    /// Append a string field
    pub fn put_string(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        if units.len() > MAX_STRING_UNITS {
            return Err(Error::StringTooLong { len: units.len() });
        }
        if units.is_empty() {
            self.buf.put_u8(0);
            return Ok(());
        }

        // count includes the terminator, at most 255 - checked above
        self.buf.put_u8((units.len() + 1) as u8);
        for unit in units {
            self.buf.put_u16_le(unit);
        }
        self.buf.put_u16_le(0);
        Ok(())
    }

    /// Append a date field
    pub fn put_date(&mut self, date: &NaiveDateTime) {
        let text = format_date(date);
        self.buf.put_u8((DATE_LENGTH + 1) as u8);
        for unit in text.encode_utf16() {
            self.buf.put_u16_le(unit);
        }
        self.buf.put_u16_le(0);
    }

    /// Finish writing and return the dataset
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Sequential little-endian reader for datasets
#[derive(Debug, Clone)]
pub struct DatasetReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> DatasetReader<'a> {
    /// Read from the start of `bytes`
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::at(bytes, 0)
    }

    /// Read from `offset` into `bytes`
    #[must_use]
    pub fn at(bytes: &'a [u8], offset: usize) -> Self {
        Self { bytes, offset }
    }

    /// Current offset
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left after the current offset
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.offset + count;
        let Some(slice) = self.bytes.get(self.offset..end) else {
            return Err(Error::BufferTooSmall {
                needed: end,
                got: self.bytes.len(),
            });
        };
        self.offset = end;
        Ok(slice)
    }

    /// Read a u8
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a u16
    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a u32
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a u64
    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Skip `count` reserved bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Read a string field (`None` when the count byte is zero)
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let count = self.read_u8()? as usize;
        if count == 0 {
            return Ok(None);
        }

        let raw = self.take(count * 2)?;
        // last unit is the terminator
        let units: Vec<u16> = raw[..raw.len() - 2]
            .chunks_exact(2)
            .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
            .collect();

        String::from_utf16(&units)
            .map(Some)
            .map_err(|_| Error::InvalidUtf16)
    }

    /// Read a date field
    pub fn read_date(&mut self) -> Result<Option<NaiveDateTime>> {
        Ok(self.read_string()?.as_deref().and_then(parse_date))
    }

    /// Read a u32-counted array of u16
    pub fn read_u16_array(&mut self) -> Result<Vec<u16>> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(2) > self.remaining() {
            return Err(Error::BufferTooSmall {
                needed: self.offset.saturating_add(count.saturating_mul(2)),
                got: self.bytes.len(),
            });
        }
        (0..count).map(|_| self.read_u16()).collect()
    }

    /// Read a u32-counted array of u32
    pub fn read_u32_array(&mut self) -> Result<Vec<u32>> {
        let count = self.read_u32()? as usize;
        if count.saturating_mul(4) > self.remaining() {
            return Err(Error::BufferTooSmall {
                needed: self.offset.saturating_add(count.saturating_mul(4)),
                got: self.bytes.len(),
            });
        }
        (0..count).map(|_| self.read_u32()).collect()
    }
}

// Little-endian primitives, size guards, and the sequential cursor used by every decoder.
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::format::{FILLER_MARKER, MAX_ITEMS, SENTINEL_DOUBLE_BITS};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, Error> {
    Ok(read_array::<1>(buf, offset)?[0])
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16, Error> {
    Ok(u16::from_le_bytes(read_array(buf, offset)?))
}

pub fn read_i16(buf: &[u8], offset: usize) -> Result<i16, Error> {
    Ok(i16::from_le_bytes(read_array(buf, offset)?))
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32, Error> {
    Ok(u32::from_le_bytes(read_array(buf, offset)?))
}

pub fn read_i32(buf: &[u8], offset: usize) -> Result<i32, Error> {
    Ok(i32::from_le_bytes(read_array(buf, offset)?))
}

pub fn read_i64(buf: &[u8], offset: usize) -> Result<i64, Error> {
    Ok(i64::from_le_bytes(read_array(buf, offset)?))
}

pub fn read_f64(buf: &[u8], offset: usize) -> Result<f64, Error> {
    Ok(f64::from_le_bytes(read_array(buf, offset)?))
}

/// Reads an 8-byte float, mapping the sentinel pattern and NaN to `None`.
pub fn read_double(buf: &[u8], offset: usize) -> Result<Option<f64>, Error> {
    let bits = u64::from_le_bytes(read_array(buf, offset)?);
    if bits == SENTINEL_DOUBLE_BITS {
        return Ok(None);
    }
    let value = f64::from_bits(bits);
    if value.is_nan() {
        return Ok(None);
    }
    Ok(Some(value))
}

pub fn validate_size(size: i64) -> Result<usize, Error> {
    if !(0..=MAX_ITEMS).contains(&size) {
        return Err(Error::new(ErrorKind::Malformed)
            .with_message(format!("item count {size} out of range")));
    }
    Ok(size as usize)
}

pub fn validate_offset(buf: &[u8], offset: usize) -> Result<(), Error> {
    if offset > buf.len() {
        return Err(Error::new(ErrorKind::Malformed)
            .with_message(format!("offset exceeds buffer length {}", buf.len()))
            .with_offset(offset as u64));
    }
    Ok(())
}

/// Returns the position just past the next `0x000F` marker at or after `offset`.
pub fn skip_to_next_marker(buf: &[u8], offset: usize) -> Result<usize, Error> {
    let mut pos = offset;
    while pos + 2 <= buf.len() {
        if u16::from_le_bytes([buf[pos], buf[pos + 1]]) == FILLER_MARKER {
            return Ok(pos + 2);
        }
        pos += 1;
    }
    Err(Error::new(ErrorKind::Malformed)
        .with_message("filler marker not found")
        .with_offset(offset as u64))
}

pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Code `1` means "use the document default" and carries no unit.
pub fn map_unit_code(code: u8) -> Option<TimeUnit> {
    match code {
        2 => Some(TimeUnit::Hours),
        4 => Some(TimeUnit::Days),
        6 => Some(TimeUnit::Weeks),
        8 | 10 => Some(TimeUnit::Months),
        12 => Some(TimeUnit::Years),
        _ => None,
    }
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], Error> {
    let end = offset.checked_add(N).ok_or_else(|| overrun(buf, offset, N))?;
    let slice = buf.get(offset..end).ok_or_else(|| overrun(buf, offset, N))?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

fn overrun(buf: &[u8], offset: usize, len: usize) -> Error {
    Error::new(ErrorKind::Malformed)
        .with_message(format!(
            "read of {len} bytes runs past end of {} byte region",
            buf.len()
        ))
        .with_offset(offset as u64)
}

/// Forward-only reader over one region of the file.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Result<Self, Error> {
        validate_offset(buf, pos)?;
        Ok(Self { buf, pos })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn skip(&mut self, len: usize) -> Result<(), Error> {
        let next = self
            .pos
            .checked_add(len)
            .ok_or_else(|| overrun(self.buf, self.pos, len))?;
        validate_offset(self.buf, next)?;
        self.pos = next;
        Ok(())
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        let value = read_u8(self.buf, self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    pub fn u16(&mut self) -> Result<u16, Error> {
        let value = read_u16(self.buf, self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        let value = read_u32(self.buf, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn i32(&mut self) -> Result<i32, Error> {
        let value = read_i32(self.buf, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    pub fn double(&mut self) -> Result<Option<f64>, Error> {
        let value = read_double(self.buf, self.pos)?;
        self.pos += 8;
        Ok(value)
    }

    /// Reads a 4-byte count and checks it against the item limit.
    pub fn count(&mut self) -> Result<usize, Error> {
        let at = self.pos;
        let raw = self.i32()?;
        validate_size(i64::from(raw)).map_err(|err| err.with_offset(at as u64))
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let start = self.pos;
        self.skip(len)?;
        Ok(&self.buf[start..self.pos])
    }

    pub fn utf16(&mut self, len: usize) -> Result<String, Error> {
        self.bytes(len).map(decode_utf16le)
    }

    pub fn skip_to_marker(&mut self) -> Result<(), Error> {
        self.pos = skip_to_next_marker(self.buf, self.pos)?;
        Ok(())
    }

    /// Consumes everything left in the region.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ByteCursor, TimeUnit, decode_utf16le, map_unit_code, read_double, read_i64, read_u16,
        read_u32, skip_to_next_marker, validate_offset, validate_size,
    };
    use crate::core::error::ErrorKind;
    use crate::core::format::SENTINEL_DOUBLE_BITS;

    #[test]
    fn integers_are_little_endian() {
        let buf = [0x34, 0x12, 0x78, 0x56, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(read_u16(&buf, 0).expect("u16"), 0x1234);
        assert_eq!(read_u32(&buf, 0).expect("u32"), 0x5678_1234);
        assert_eq!(read_i64(&buf, 0).expect("i64"), 0x5678_1234);
    }

    #[test]
    fn reads_past_end_are_malformed() {
        let buf = [0u8; 3];
        let err = read_u32(&buf, 0).expect_err("too short");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        let err = read_u16(&buf, usize::MAX).expect_err("overflowing offset");
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn sentinel_and_nan_are_absent() {
        let sentinel = SENTINEL_DOUBLE_BITS.to_le_bytes();
        assert_eq!(read_double(&sentinel, 0).expect("sentinel"), None);
        let nan = f64::NAN.to_le_bytes();
        assert_eq!(read_double(&nan, 0).expect("nan"), None);
        let zero = 0.0f64.to_le_bytes();
        assert_eq!(read_double(&zero, 0).expect("zero"), Some(0.0));
    }

    #[test]
    fn size_limits() {
        assert_eq!(validate_size(0).expect("zero"), 0);
        assert_eq!(validate_size(100_000).expect("max"), 100_000);
        assert_eq!(
            validate_size(100_001).expect_err("over").kind(),
            ErrorKind::Malformed
        );
        assert_eq!(validate_size(-1).expect_err("negative").kind(), ErrorKind::Malformed);
    }

    #[test]
    fn offset_may_equal_length() {
        let buf = [0u8; 4];
        validate_offset(&buf, 4).expect("end is valid");
        assert!(validate_offset(&buf, 5).is_err());
    }

    #[test]
    fn skip_finds_filler_marker() {
        let buf = [0xAA, 0x0F, 0x0F, 0x00, 0x01];
        assert_eq!(skip_to_next_marker(&buf, 0).expect("marker"), 4);
        assert!(skip_to_next_marker(&buf, 3).is_err());
    }

    #[test]
    fn unit_codes() {
        assert_eq!(map_unit_code(1), None);
        assert_eq!(map_unit_code(2), Some(TimeUnit::Hours));
        assert_eq!(map_unit_code(4), Some(TimeUnit::Days));
        assert_eq!(map_unit_code(6), Some(TimeUnit::Weeks));
        assert_eq!(map_unit_code(10), Some(TimeUnit::Months));
        assert_eq!(map_unit_code(12), Some(TimeUnit::Years));
        assert_eq!(map_unit_code(99), None);
    }

    #[test]
    fn utf16_decoding_ignores_dangling_byte() {
        let bytes = [b'O', 0, b'K', 0, b'!'];
        assert_eq!(decode_utf16le(&bytes), "OK");
    }

    #[test]
    fn cursor_tracks_position() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3i32.to_le_bytes());
        buf.extend_from_slice(&[b'a', 0, b'b', 0]);
        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(cursor.count().expect("count"), 3);
        assert_eq!(cursor.utf16(4).expect("text"), "ab");
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.u8().is_err());
    }

    #[test]
    fn cursor_count_reports_offset() {
        let mut buf = vec![0u8; 2];
        buf.extend_from_slice(&200_000i32.to_le_bytes());
        let mut cursor = ByteCursor::at(&buf, 2).expect("cursor");
        let err = cursor.count().expect_err("oversized");
        assert_eq!(err.offset(), Some(2));
    }
}

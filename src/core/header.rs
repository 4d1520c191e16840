// Prologue shared by every column sub-block: opaque lead-in, name, index, flags, skip region.
use crate::core::bytes::ByteCursor;
use crate::core::error::{Error, ErrorKind};
use crate::core::format::MAX_NAME_LEN;

/// Tag byte, one opaque byte, and the six-byte child marker.
pub const HEADER_LEAD_IN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnHeader {
    pub name: String,
    pub index: u16,
    pub flags: u16,
    pub skipped: Vec<u8>,
}

impl ColumnHeader {
    /// Parses the header at the start of `block`; returns it with the bytes consumed.
    pub fn read(block: &[u8], skip_bytes: usize) -> Result<(Self, usize), Error> {
        let mut cursor = ByteCursor::at(block, 0)?;
        let header = Self::read_from(&mut cursor, skip_bytes)?;
        Ok((header, cursor.position()))
    }

    pub fn read_from(cursor: &mut ByteCursor<'_>, skip_bytes: usize) -> Result<Self, Error> {
        cursor.skip(HEADER_LEAD_IN)?;
        let at = cursor.position();
        let name_len = cursor.i32()?;
        if name_len < 1 || name_len as usize > MAX_NAME_LEN {
            return Err(Error::new(ErrorKind::Malformed)
                .with_message(format!("column name length {name_len} out of range"))
                .with_offset(at as u64));
        }
        let name = cursor.utf16(name_len as usize)?;
        let index = cursor.u16()?;
        let flags = cursor.u16()?;
        let skipped = cursor.bytes(skip_bytes)?.to_vec();
        Ok(Self {
            name,
            index,
            flags,
            skipped,
        })
    }
}

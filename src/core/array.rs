// Fixed-width record arrays and length-prefixed string arrays reused across column kinds.
use crate::core::bytes::ByteCursor;
use crate::core::error::{Error, ErrorKind};

/// Raw records of one declared width; each decoder gives them meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedItems<'a> {
    pub width: usize,
    pub items: Vec<&'a [u8]>,
}

impl<'a> FixedItems<'a> {
    pub fn read(cursor: &mut ByteCursor<'a>) -> Result<Self, Error> {
        // offset to data
        cursor.skip(2)?;
        let count = cursor.count()?;
        let width = cursor.u16()? as usize;
        // offset to end
        cursor.skip(4)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(cursor.bytes(width)?);
        }
        Ok(Self { width, items })
    }

    /// Fails when records are narrower than `needed` bytes.
    pub fn require_width(&self, needed: usize) -> Result<(), Error> {
        if self.width < needed && !self.items.is_empty() {
            return Err(Error::new(ErrorKind::Malformed).with_message(format!(
                "record width {} too small, expected at least {needed}",
                self.width
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reads a string array. `inclusive` reads one slot past the declared count.
pub fn read_strings(cursor: &mut ByteCursor<'_>, inclusive: bool) -> Result<Vec<String>, Error> {
    let mut count = cursor.count()?;
    if inclusive {
        count += 1;
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        // per-item tag
        cursor.skip(2)?;
        let len = cursor.count()?;
        items.push(cursor.utf16(len)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::{FixedItems, read_strings};
    use crate::core::bytes::ByteCursor;
    use crate::core::error::ErrorKind;

    fn fixed_bytes(count: i32, width: u16, body: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&width.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(body);
        buf
    }

    fn string_bytes(count: i32, items: &[&str]) -> Vec<u8> {
        let mut buf = count.to_le_bytes().to_vec();
        for item in items {
            let encoded: Vec<u8> = item.encode_utf16().flat_map(u16::to_le_bytes).collect();
            buf.extend_from_slice(&0x0101u16.to_le_bytes());
            buf.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
            buf.extend_from_slice(&encoded);
        }
        buf
    }

    #[test]
    fn fixed_items_split_by_width() {
        let buf = fixed_bytes(3, 2, &[1, 0, 2, 0, 3, 0, 0xFF]);
        let mut cursor = ByteCursor::new(&buf);
        let items = FixedItems::read(&mut cursor).expect("items");
        assert_eq!(items.width, 2);
        assert_eq!(items.items, vec![&[1u8, 0][..], &[2, 0][..], &[3, 0][..]]);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn fixed_items_reject_huge_count() {
        let buf = fixed_bytes(200_000, 4, &[]);
        let err = FixedItems::read(&mut ByteCursor::new(&buf)).expect_err("count");
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn fixed_items_reject_truncated_body() {
        let buf = fixed_bytes(2, 4, &[0; 6]);
        let err = FixedItems::read(&mut ByteCursor::new(&buf)).expect_err("truncated");
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn narrow_records_fail_width_check() {
        let buf = fixed_bytes(1, 2, &[0, 0]);
        let items = FixedItems::read(&mut ByteCursor::new(&buf)).expect("items");
        assert!(items.require_width(2).is_ok());
        assert!(items.require_width(4).is_err());
    }

    #[test]
    fn strings_exclusive_and_inclusive() {
        let buf = string_bytes(2, &["Low", "High"]);
        let items = read_strings(&mut ByteCursor::new(&buf), false).expect("strings");
        assert_eq!(items, vec!["Low".to_string(), "High".to_string()]);

        let buf = string_bytes(1, &["Low", "High"]);
        let items = read_strings(&mut ByteCursor::new(&buf), true).expect("inclusive");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn string_length_past_end_is_malformed() {
        let mut buf = 1i32.to_le_bytes().to_vec();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&40i32.to_le_bytes());
        buf.extend_from_slice(&[b'a', 0]);
        let err = read_strings(&mut ByteCursor::new(&buf), false).expect_err("overrun");
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }
}

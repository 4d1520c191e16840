//! Purpose: Build small synthetic FastTrack files for integration tests.
//! Exports: `FileBuilder`, column sub-block helpers, and payload encoders.
//! Role: Keeps byte-level layout in one place so tests read as table contents.
//! Invariants: Column blocks are padded so they classify as column containers.
#![allow(dead_code)]

use fasttrack::api::ColumnKind;
use fasttrack::core::format::{
    CHILD_BLOCK_MARKER, FILE_HEADER_LEN, PARENT_BLOCK_MARKERS, SENTINEL_DOUBLE_BITS,
    TABLE_DEFINITION_MAX_LEN, TABLE_MARKER,
};

pub const BOOLEAN: u8 = 0x45;
pub const ENUM: u8 = 0x46;
pub const DATE: u8 = 0x4A;
pub const TIME: u8 = 0x4B;
pub const DURATION: u8 = 0x4C;
pub const WORK: u8 = 0x4F;
pub const INTEGER: u8 = 0x50;
pub const SHORT: u8 = 0x51;
pub const IDENTIFIER: u8 = 0x52;
pub const STRING: u8 = 0x5A;

pub const UNIT_HOURS: u8 = 2;
pub const UNIT_DAYS: u8 = 4;
pub const UNIT_WEEKS: u8 = 6;
pub const UNIT_QUARTERS: u8 = 10;

pub struct FileBuilder {
    buf: Vec<u8>,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; FILE_HEADER_LEN],
        }
    }

    /// Appends a table definition block declaring `name`.
    pub fn table(mut self, name: &str) -> Self {
        let encoded = utf16(name);
        let mut block = PARENT_BLOCK_MARKERS[0].to_vec();
        block.extend_from_slice(&TABLE_MARKER);
        block.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
        block.extend_from_slice(&encoded);
        assert!(block.len() < TABLE_DEFINITION_MAX_LEN, "table block too long");
        self.buf.extend_from_slice(&block);
        self
    }

    /// Appends a column container block holding `columns` in order.
    pub fn columns(mut self, columns: &[Vec<u8>]) -> Self {
        let mut block = PARENT_BLOCK_MARKERS[2].to_vec();
        for column in columns {
            block.extend_from_slice(column);
        }
        if block.len() < TABLE_DEFINITION_MAX_LEN {
            block.resize(TABLE_DEFINITION_MAX_LEN, 0);
        }
        self.buf.extend_from_slice(&block);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// One column sub-block: lead-in, header, kind-specific skip region, then `payload`.
pub fn column(tag: u8, name: &str, index: u16, payload: &[u8]) -> Vec<u8> {
    let encoded = utf16(name);
    let mut buf = vec![tag, 0x00];
    buf.extend_from_slice(&CHILD_BLOCK_MARKER);
    buf.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
    buf.extend_from_slice(&encoded);
    buf.extend_from_slice(&index.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend(std::iter::repeat_n(0u8, ColumnKind::from_tag(tag).post_header_skip()));
    buf.extend_from_slice(payload);
    buf
}

/// Fixed-width array with a declared `count` that may disagree with `records`.
pub fn fixed_with_count(count: i32, width: u16, records: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = 0u16.to_le_bytes().to_vec();
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&width.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    for record in records {
        buf.extend_from_slice(record);
    }
    buf
}

pub fn fixed(width: u16, records: &[Vec<u8>]) -> Vec<u8> {
    fixed_with_count(records.len() as i32, width, records)
}

pub fn dates(days: &[i32]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = days.iter().map(|day| day.to_le_bytes().to_vec()).collect();
    fixed(4, &records)
}

pub fn times(minutes: &[i16]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = minutes.iter().map(|m| m.to_le_bytes().to_vec()).collect();
    fixed(2, &records)
}

pub fn shorts(values: &[i16]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = values.iter().map(|v| v.to_le_bytes().to_vec()).collect();
    fixed(2, &records)
}

pub fn integers(values: &[i32]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = values.iter().map(|v| v.to_le_bytes().to_vec()).collect();
    fixed(4, &records)
}

/// `None` encodes the "no value" sentinel.
pub fn durations(values: &[Option<f64>], unit_code: u8) -> Vec<u8> {
    let records: Vec<Vec<u8>> = values
        .iter()
        .map(|value| match value {
            Some(value) => value.to_le_bytes().to_vec(),
            None => SENTINEL_DOUBLE_BITS.to_le_bytes().to_vec(),
        })
        .collect();
    let mut buf = fixed(8, &records);
    buf.push(unit_code);
    buf
}

/// String array whose declared count is one less than `items` (the inclusive layout).
pub fn option_strings(items: &[&str]) -> Vec<u8> {
    let mut buf = (items.len() as i32 - 1).to_le_bytes().to_vec();
    for item in items {
        let encoded = utf16(item);
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
        buf.extend_from_slice(&encoded);
    }
    buf
}

pub fn choices(options: &[&str], indices: &[u16]) -> Vec<u8> {
    let mut buf = option_strings(options);
    let records: Vec<Vec<u8>> = indices.iter().map(|i| i.to_le_bytes().to_vec()).collect();
    buf.extend_from_slice(&fixed(2, &records));
    buf
}

pub fn flags(codes: &[u16]) -> Vec<u8> {
    let mut buf = option_strings(&["No", "Yes"]);
    buf.extend_from_slice(&(codes.len() as i32).to_le_bytes());
    for code in codes {
        buf.extend_from_slice(&code.to_le_bytes());
    }
    buf
}

/// Offset-table text payload; an empty string decodes as null.
pub fn text(values: &[&str]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = values.iter().map(|value| utf16(value)).collect();
    let mut buf = vec![0u8];
    buf.extend_from_slice(&(values.len() as i32).to_le_bytes());
    let mut offset = 0u32;
    buf.extend_from_slice(&offset.to_le_bytes());
    for item in &encoded {
        offset += item.len() as u32;
        buf.extend_from_slice(&offset.to_le_bytes());
    }
    for item in &encoded {
        buf.extend_from_slice(item);
    }
    buf
}

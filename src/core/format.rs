//! Purpose: Centralize the FastTrack on-disk constants recovered from sample files.
//! Exports: marker patterns, block thresholds, sentinel bits, limits, and the date epoch.
//! Role: Shared policy for framing, classification, and value decoding.
//! Invariants: Marker lists are additive; a new file generation adds a pattern, never edits one.
//! Invariants: Nothing outside this module hardcodes a marker byte.

use time::Date;
use time::macros::date;

/// Bytes before the first block; treated as an opaque file header.
pub const FILE_HEADER_LEN: usize = 64;

/// Blocks shorter than this are table definitions, the rest hold columns.
pub const TABLE_DEFINITION_MAX_LEN: usize = 128;

pub const PARENT_MARKER_LEN: usize = 11;

/// Top-level block boundaries. The third byte differs between file generations.
pub const PARENT_BLOCK_MARKERS: [[u8; PARENT_MARKER_LEN]; 4] = [
    [0xFE, 0xFF, 0x01, 0x00, 0x00, 0x00, 0xF0, 0xCA, 0x0B, 0x00, 0x00],
    [0xFE, 0xFF, 0x02, 0x00, 0x00, 0x00, 0xF0, 0xCA, 0x0B, 0x00, 0x00],
    [0xFE, 0xFF, 0x03, 0x00, 0x00, 0x00, 0xF0, 0xCA, 0x0B, 0x00, 0x00],
    [0xFE, 0xFF, 0x05, 0x00, 0x00, 0x00, 0xF0, 0xCA, 0x0B, 0x00, 0x00],
];

/// Precedes the name length inside a table definition block.
pub const TABLE_MARKER: [u8; 7] = [0xCB, 0xFD, 0x0A, 0x00, 0x00, 0x00, 0x00];

/// Found two bytes into every column sub-block.
pub const CHILD_BLOCK_MARKER: [u8; 6] = [0xDA, 0xFE, 0x06, 0x00, 0x00, 0x00];

/// Distance from the start of a column sub-block to its child marker.
pub const CHILD_MARKER_OFFSET: usize = 2;

/// Terminates undocumented filler regions.
pub const FILLER_MARKER: u16 = 0x000F;

/// "No value" for 8-byte floating fields.
pub const SENTINEL_DOUBLE_BITS: u64 = 0x3949_F623_D5A8_A733;

/// Upper bound for any count or length read from the file.
pub const MAX_ITEMS: i64 = 100_000;

pub const MAX_NAME_LEN: usize = 255;

/// Day zero for date columns.
pub const DATE_EPOCH: Date = date!(1979 - 12 - 31);

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Unit byte marking a duration stored in quarters; values are scaled to months.
pub const QUARTER_UNIT_CODE: u8 = 10;
pub const QUARTER_SCALE: f64 = 3.0;

#[cfg(test)]
mod tests {
    use super::{CHILD_BLOCK_MARKER, DATE_EPOCH, PARENT_BLOCK_MARKERS, TABLE_MARKER};
    use time::Month;

    #[test]
    fn epoch_is_last_day_of_1979() {
        assert_eq!(DATE_EPOCH.year(), 1979);
        assert_eq!(DATE_EPOCH.month(), Month::December);
        assert_eq!(DATE_EPOCH.day(), 31);
    }

    #[test]
    fn marker_patterns_are_distinct() {
        for (idx, pattern) in PARENT_BLOCK_MARKERS.iter().enumerate() {
            for other in PARENT_BLOCK_MARKERS.iter().skip(idx + 1) {
                assert_ne!(pattern, other);
            }
            assert!(!pattern.starts_with(&TABLE_MARKER[..2]));
            assert!(!pattern.starts_with(&CHILD_BLOCK_MARKER[..2]));
        }
    }
}

//! Purpose: Decode one column sub-block into typed per-row values.
//! Exports: `Column`, `ColumnKind`, `ColumnData`, `date_from_days`, `time_from_minutes`.
//! Role: Tag dispatch to one decoder per on-disk value encoding; the scanner registers the result.
//! Invariants: Every tag maps to exactly one `ColumnKind`; unmapped tags are `Unknown`.
//! Invariants: Each kind has a fixed skip between the header flags and its payload.
//! Invariants: Decoders never read past the sub-block; bad lengths are `Malformed`.
//! Invariants: Offsets in errors are relative to the sub-block start.
use serde::Serialize;
use time::{Date, Duration, Time};

use crate::core::array::{FixedItems, read_strings};
use crate::core::bytes::{
    ByteCursor, TimeUnit, decode_utf16le, map_unit_code, read_double, read_i16, read_i32,
    read_u8, read_u16,
};
use crate::core::error::{Error, ErrorKind};
use crate::core::format::{DATE_EPOCH, MINUTES_PER_DAY, QUARTER_SCALE, QUARTER_UNIT_CODE};
use crate::core::header::ColumnHeader;
use crate::core::table::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Date,
    Time,
    Duration,
    Number,
    Percent,
    Integer,
    Identifier,
    Short,
    Double,
    Enum,
    Boolean,
    Assignment,
    Relation,
    String,
    Calendar,
    Unknown,
}

const fn build_kind_table() -> [ColumnKind; 256] {
    let mut table = [ColumnKind::Unknown; 256];
    table[0x45] = ColumnKind::Boolean;
    table[0x46] = ColumnKind::Enum;
    table[0x4A] = ColumnKind::Date;
    table[0x4B] = ColumnKind::Time;
    table[0x4C] = ColumnKind::Duration;
    table[0x4D] = ColumnKind::Number;
    table[0x4E] = ColumnKind::Percent;
    // work
    table[0x4F] = ColumnKind::Duration;
    table[0x50] = ColumnKind::Integer;
    table[0x51] = ColumnKind::Short;
    table[0x52] = ColumnKind::Identifier;
    table[0x53] = ColumnKind::Double;
    // currency
    table[0x54] = ColumnKind::Number;
    // notes
    table[0x59] = ColumnKind::String;
    table[0x5A] = ColumnKind::String;
    table[0x5B] = ColumnKind::Assignment;
    table[0x5C] = ColumnKind::Relation;
    table[0x5D] = ColumnKind::Calendar;
    table
}

static COLUMN_KINDS: [ColumnKind; 256] = build_kind_table();

impl ColumnKind {
    pub fn from_tag(tag: u8) -> Self {
        COLUMN_KINDS[tag as usize]
    }

    /// Opaque bytes between the header's flags word and the payload.
    pub fn post_header_skip(self) -> usize {
        match self {
            ColumnKind::Date
            | ColumnKind::Time
            | ColumnKind::Duration
            | ColumnKind::Number
            | ColumnKind::Percent
            | ColumnKind::Integer
            | ColumnKind::Identifier
            | ColumnKind::Short
            | ColumnKind::Calendar => 12,
            ColumnKind::Double => 16,
            ColumnKind::Enum | ColumnKind::Boolean => 8,
            ColumnKind::String => 6,
            ColumnKind::Assignment | ColumnKind::Relation => 4,
            ColumnKind::Unknown => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Dates(Vec<Option<Date>>),
    Times(Vec<Option<Time>>),
    Durations {
        values: Vec<Option<f64>>,
        unit_code: u8,
        unit: Option<TimeUnit>,
    },
    Numbers(Vec<Option<f64>>),
    Integers(Vec<i64>),
    Choices {
        options: Vec<String>,
        values: Vec<Option<String>>,
    },
    Flags {
        options: Vec<String>,
        values: Vec<Option<bool>>,
    },
    Links {
        preamble: Vec<String>,
        values: Vec<String>,
    },
    Text(Vec<Option<String>>),
    Raw(Vec<Vec<u8>>),
    Empty,
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Dates(values) => values.len(),
            ColumnData::Times(values) => values.len(),
            ColumnData::Durations { values, .. } => values.len(),
            ColumnData::Numbers(values) => values.len(),
            ColumnData::Integers(values) => values.len(),
            ColumnData::Choices { values, .. } => values.len(),
            ColumnData::Flags { values, .. } => values.len(),
            ColumnData::Links { values, .. } => values.len(),
            ColumnData::Text(values) => values.len(),
            ColumnData::Raw(values) => values.len(),
            ColumnData::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_values(self) -> Vec<Option<Value>> {
        match self {
            ColumnData::Dates(values) => map_some(values, Value::Date),
            ColumnData::Times(values) => map_some(values, Value::Time),
            ColumnData::Durations { values, unit, .. } => {
                map_some(values, |value| Value::Duration { value, unit })
            }
            ColumnData::Numbers(values) => map_some(values, Value::Number),
            ColumnData::Integers(values) => {
                values.into_iter().map(|value| Some(Value::Integer(value))).collect()
            }
            ColumnData::Choices { values, .. } => map_some(values, Value::Text),
            ColumnData::Flags { values, .. } => map_some(values, Value::Boolean),
            ColumnData::Links { values, .. } => values
                .into_iter()
                .map(|value| (!value.is_empty()).then_some(Value::Text(value)))
                .collect(),
            ColumnData::Text(values) => map_some(values, Value::Text),
            ColumnData::Raw(values) => {
                values.into_iter().map(|value| Some(Value::Bytes(value))).collect()
            }
            ColumnData::Empty => Vec::new(),
        }
    }
}

fn map_some<T>(values: Vec<Option<T>>, f: impl Fn(T) -> Value) -> Vec<Option<Value>> {
    values.into_iter().map(|value| value.map(&f)).collect()
}

/// One decoded column sub-block.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub tag: u8,
    pub kind: ColumnKind,
    pub header: ColumnHeader,
    pub data: ColumnData,
    /// Bytes after the payload; kept for diagnostics, never interpreted.
    pub trailer: Vec<u8>,
}

impl Column {
    /// Decodes the sub-block `block`, whose first byte is the type tag.
    ///
    /// Offsets in returned errors are relative to the start of `block`.
    pub fn decode(block: &[u8]) -> Result<Self, Error> {
        let tag = read_u8(block, 0)?;
        let kind = ColumnKind::from_tag(tag);
        let mut cursor = ByteCursor::new(block);
        let header = ColumnHeader::read_from(&mut cursor, kind.post_header_skip())?;
        let data = match kind {
            ColumnKind::Date => read_dates(&mut cursor)?,
            ColumnKind::Time => read_times(&mut cursor)?,
            ColumnKind::Duration => read_durations(&mut cursor)?,
            ColumnKind::Number | ColumnKind::Percent => read_numbers(&mut cursor)?,
            ColumnKind::Integer | ColumnKind::Identifier => read_integers(&mut cursor)?,
            ColumnKind::Short => read_shorts(&mut cursor)?,
            ColumnKind::Double => read_inline_doubles(&mut cursor)?,
            ColumnKind::Enum => read_choices(&mut cursor)?,
            ColumnKind::Boolean => read_flags(&mut cursor)?,
            ColumnKind::Assignment | ColumnKind::Relation => read_links(&mut cursor)?,
            ColumnKind::String => read_text(&mut cursor)?,
            ColumnKind::Calendar => read_raw(&mut cursor)?,
            ColumnKind::Unknown => ColumnData::Empty,
        };
        let trailer = cursor.rest().to_vec();
        Ok(Self {
            tag,
            kind,
            header,
            data,
            trailer,
        })
    }

    /// Unit carried by a duration column, when its unit byte is informative.
    pub fn unit(&self) -> Option<TimeUnit> {
        match &self.data {
            ColumnData::Durations { unit, .. } => *unit,
            _ => None,
        }
    }
}

fn fixed_values<T>(
    cursor: &mut ByteCursor<'_>,
    width: usize,
    decode: impl Fn(&[u8]) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let records = FixedItems::read(cursor)?;
    records.require_width(width)?;
    records.items.into_iter().map(decode).collect()
}

pub fn date_from_days(days: i32) -> Option<Date> {
    if days <= 0 {
        return None;
    }
    DATE_EPOCH.checked_add(Duration::days(i64::from(days)))
}

pub fn time_from_minutes(minutes: i16) -> Option<Time> {
    let minutes = i32::from(minutes);
    if !(0..MINUTES_PER_DAY).contains(&minutes) {
        return None;
    }
    Time::from_hms((minutes / 60) as u8, (minutes % 60) as u8, 0).ok()
}

fn read_dates(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let values = fixed_values(cursor, 4, |item| Ok(date_from_days(read_i32(item, 0)?)))?;
    Ok(ColumnData::Dates(values))
}

fn read_times(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let values = fixed_values(cursor, 2, |item| Ok(time_from_minutes(read_i16(item, 0)?)))?;
    Ok(ColumnData::Times(values))
}

fn read_durations(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let mut values = fixed_values(cursor, 8, |item| read_double(item, 0))?;
    let unit_code = cursor.u8()?;
    if unit_code == QUARTER_UNIT_CODE {
        for value in values.iter_mut().flatten() {
            *value *= QUARTER_SCALE;
        }
    }
    Ok(ColumnData::Durations {
        values,
        unit_code,
        unit: map_unit_code(unit_code),
    })
}

fn read_numbers(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let values = fixed_values(cursor, 8, |item| read_double(item, 0))?;
    Ok(ColumnData::Numbers(values))
}

fn read_integers(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let values = fixed_values(cursor, 4, |item| Ok(i64::from(read_i32(item, 0)?)))?;
    Ok(ColumnData::Integers(values))
}

fn read_shorts(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let values = fixed_values(cursor, 2, |item| Ok(i64::from(read_i16(item, 0)?)))?;
    Ok(ColumnData::Integers(values))
}

fn read_inline_doubles(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let count = cursor.count()?;
    let values = (0..count)
        .map(|_| cursor.double())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::Numbers(values))
}

fn read_choices(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let options = read_strings(cursor, true)?;
    let values = fixed_values(cursor, 2, |item| {
        let index = read_u16(item, 0)? as usize;
        Ok(index
            .checked_sub(1)
            .and_then(|slot| options.get(slot))
            .cloned())
    })?;
    Ok(ColumnData::Choices { options, values })
}

fn read_flags(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let options = read_strings(cursor, true)?;
    let count = cursor.count()?;
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(match cursor.u16()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        });
    }
    Ok(ColumnData::Flags { options, values })
}

fn read_links(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let discriminator = cursor.u8()?;
    if discriminator == 0 {
        let values = read_strings(cursor, false)?;
        return Ok(ColumnData::Links {
            preamble: Vec::new(),
            values,
        });
    }
    let preamble = read_strings(cursor, false)?;
    cursor.skip_to_marker()?;
    let values = read_strings(cursor, false)?;
    Ok(ColumnData::Links { preamble, values })
}

fn read_text(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    if cursor.u8()? != 0 {
        // block size
        cursor.skip(4)?;
    }
    let count = cursor.count()?;
    let mut offsets = Vec::with_capacity(count + 1);
    for _ in 0..=count {
        offsets.push(cursor.u32()? as usize);
    }
    let data_start = cursor.position();
    let data_len = offsets.last().copied().unwrap_or(0);
    let data = cursor.bytes(data_len)?;
    let mut values = Vec::with_capacity(count);
    for pair in offsets.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if start > end || end > data.len() {
            return Err(Error::new(ErrorKind::Malformed)
                .with_message(format!("string offsets {start}..{end} out of order"))
                .with_offset(data_start as u64));
        }
        let text = decode_utf16le(&data[start..end]);
        values.push((!text.is_empty()).then_some(text));
    }
    Ok(ColumnData::Text(values))
}

fn read_raw(cursor: &mut ByteCursor<'_>) -> Result<ColumnData, Error> {
    let records = FixedItems::read(cursor)?;
    Ok(ColumnData::Raw(
        records.items.iter().map(|item| item.to_vec()).collect(),
    ))
}

//! Purpose: Frame a FastTrack buffer into blocks and drive column decoding into tables.
//! Exports: `scan`, `find_blocks`, `split_columns`, `ScanOutput`, `BlockExtent`, `ColumnRecord`.
//! Role: Single forward pass; the only place that decides which decoded columns are kept.
//! Invariants: Block extents tile `[FILE_HEADER_LEN, len)` with no gaps or overlaps.
//! Invariants: A malformed column is dropped on its own unless the policy is `Stop`.
//! Invariants: All mutable parse state lives in `ScanState`, owned by one `scan` call.

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::{debug, warn};

use crate::core::bytes::{ByteCursor, TimeUnit, read_u8};
use crate::core::column::{Column, ColumnKind};
use crate::core::error::{Error, ErrorKind};
use crate::core::field::{Field, FieldClass, TableKind};
use crate::core::format::{
    CHILD_BLOCK_MARKER, CHILD_MARKER_OFFSET, FILE_HEADER_LEN, MAX_NAME_LEN, PARENT_BLOCK_MARKERS,
    PARENT_MARKER_LEN, TABLE_DEFINITION_MAX_LEN, TABLE_MARKER,
};
use crate::core::header::ColumnHeader;
use crate::core::table::Table;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ColumnErrorPolicy {
    /// Drop the column, log it, and keep going.
    #[default]
    Skip,
    Stop,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockKind {
    TableDefinition,
    ColumnContainer,
}

impl BlockKind {
    pub fn classify(len: usize) -> Self {
        if len < TABLE_DEFINITION_MAX_LEN {
            BlockKind::TableDefinition
        } else {
            BlockKind::ColumnContainer
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockExtent {
    pub start: usize,
    pub end: usize,
    pub kind: BlockKind,
    /// Declared name, for table definitions that carry one.
    pub table_name: Option<String>,
    pub table: Option<TableKind>,
    pub columns: usize,
}

impl BlockExtent {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnOutcome {
    Registered,
    NoCurrentTable,
    UnknownField,
    Duplicate,
    Malformed(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnRecord {
    pub block: usize,
    pub offset: usize,
    pub len: usize,
    pub tag: u8,
    pub kind: ColumnKind,
    pub name: Option<String>,
    pub index: Option<u16>,
    pub table: Option<TableKind>,
    pub field: Option<Field>,
    pub values: usize,
    pub outcome: ColumnOutcome,
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub tables: BTreeMap<TableKind, Table>,
    pub duration_unit: Option<TimeUnit>,
    pub work_unit: Option<TimeUnit>,
    pub blocks: Vec<BlockExtent>,
    pub columns: Vec<ColumnRecord>,
}

/// Splits `buf` into top-level block ranges starting at the end of the file header.
pub fn find_blocks(buf: &[u8]) -> Result<Vec<Range<usize>>, Error> {
    if buf.len() < FILE_HEADER_LEN {
        return Err(Error::new(ErrorKind::Malformed)
            .with_message(format!(
                "file is {} bytes, shorter than the {FILE_HEADER_LEN} byte header",
                buf.len()
            ))
            .with_offset(0));
    }
    let mut starts = Vec::new();
    if buf.len() > FILE_HEADER_LEN {
        starts.push(FILE_HEADER_LEN);
    }
    let mut pos = FILE_HEADER_LEN + 1;
    while pos + PARENT_MARKER_LEN <= buf.len() {
        if is_parent_marker(buf, pos) {
            starts.push(pos);
        }
        pos += 1;
    }
    Ok(tile(&starts, buf.len()))
}

fn is_parent_marker(buf: &[u8], pos: usize) -> bool {
    let window = &buf[pos..pos + PARENT_MARKER_LEN];
    PARENT_BLOCK_MARKERS
        .iter()
        .any(|marker| window == marker.as_slice())
}

fn tile(starts: &[usize], end: usize) -> Vec<Range<usize>> {
    starts
        .iter()
        .enumerate()
        .map(|(idx, start)| *start..starts.get(idx + 1).copied().unwrap_or(end))
        .collect()
}

/// Column sub-block ranges within one container block, relative to `block`.
pub fn split_columns(block: &[u8]) -> Vec<Range<usize>> {
    let marker_len = CHILD_BLOCK_MARKER.len();
    let mut starts = Vec::new();
    let mut pos = CHILD_MARKER_OFFSET;
    while pos + marker_len <= block.len() {
        if block[pos..pos + marker_len] == CHILD_BLOCK_MARKER {
            starts.push(pos - CHILD_MARKER_OFFSET);
            pos += marker_len;
        } else {
            pos += 1;
        }
    }
    tile(&starts, block.len())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub kind: Option<TableKind>,
}

/// Reads the declared table name; `None` when the block has no table marker.
pub fn read_table_definition(block: &[u8]) -> Result<Option<TableDefinition>, Error> {
    let Some(marker_at) = block
        .windows(TABLE_MARKER.len())
        .position(|window| window == TABLE_MARKER)
    else {
        return Ok(None);
    };
    let mut cursor = ByteCursor::at(block, marker_at + TABLE_MARKER.len())?;
    let at = cursor.position();
    let name_len = cursor.i32()?;
    if name_len < 1 || name_len as usize > MAX_NAME_LEN {
        return Err(Error::new(ErrorKind::Malformed)
            .with_message(format!("table name length {name_len} out of range"))
            .with_offset(at as u64));
    }
    let name = cursor.utf16(name_len as usize)?.to_uppercase();
    let kind = TableKind::from_declared_name(&name);
    Ok(Some(TableDefinition { name, kind }))
}

struct ScanState {
    policy: ColumnErrorPolicy,
    current_table: Option<TableKind>,
    tables: BTreeMap<TableKind, Table>,
    duration_unit: Option<TimeUnit>,
    work_unit: Option<TimeUnit>,
    blocks: Vec<BlockExtent>,
    columns: Vec<ColumnRecord>,
}

impl ScanState {
    fn new(policy: ColumnErrorPolicy) -> Self {
        Self {
            policy,
            current_table: None,
            tables: BTreeMap::new(),
            duration_unit: None,
            work_unit: None,
            blocks: Vec::new(),
            columns: Vec::new(),
        }
    }

    fn table_block(&mut self, buf: &[u8], range: Range<usize>) -> Result<(), Error> {
        let definition = read_table_definition(&buf[range.clone()])
            .map_err(|err| err.rebase_offset(range.start))?;
        self.current_table = definition.as_ref().and_then(|def| def.kind);
        match &definition {
            Some(TableDefinition { name, kind: Some(kind) }) => {
                debug!(offset = range.start, table = name.as_str(), "entering table");
                self.tables.entry(*kind).or_insert_with(|| Table::new(*kind));
            }
            Some(TableDefinition { name, kind: None }) => {
                debug!(offset = range.start, table = name.as_str(), "ignoring unrecognized table");
            }
            None => debug!(offset = range.start, "table block without table marker"),
        }
        self.blocks.push(BlockExtent {
            start: range.start,
            end: range.end,
            kind: BlockKind::TableDefinition,
            table_name: definition.as_ref().map(|def| def.name.clone()),
            table: self.current_table,
            columns: 0,
        });
        Ok(())
    }

    fn column_block(&mut self, buf: &[u8], range: Range<usize>) -> Result<(), Error> {
        let block_index = self.blocks.len();
        let block = &buf[range.clone()];
        let sub_blocks = split_columns(block);
        debug!(
            offset = range.start,
            len = block.len(),
            columns = sub_blocks.len(),
            "scanning column block"
        );
        for sub in &sub_blocks {
            let offset = range.start + sub.start;
            self.column(block_index, offset, &block[sub.clone()])?;
        }
        self.blocks.push(BlockExtent {
            start: range.start,
            end: range.end,
            kind: BlockKind::ColumnContainer,
            table_name: None,
            table: self.current_table,
            columns: sub_blocks.len(),
        });
        Ok(())
    }

    fn column(&mut self, block: usize, offset: usize, bytes: &[u8]) -> Result<(), Error> {
        let tag = read_u8(bytes, 0).map_err(|err| err.rebase_offset(offset))?;
        let kind = ColumnKind::from_tag(tag);
        let mut record = ColumnRecord {
            block,
            offset,
            len: bytes.len(),
            tag,
            kind,
            name: None,
            index: None,
            table: self.current_table,
            field: None,
            values: 0,
            outcome: ColumnOutcome::Registered,
        };
        match Column::decode(bytes) {
            Ok(column) => {
                record.name = Some(column.header.name.clone());
                record.index = Some(column.header.index);
                record.values = column.data.len();
                record.outcome = self.register(column, &mut record.field);
            }
            Err(err) => {
                let err = err.rebase_offset(offset);
                if self.policy == ColumnErrorPolicy::Stop {
                    return Err(err);
                }
                if let Ok((header, _)) = ColumnHeader::read(bytes, kind.post_header_skip()) {
                    record.name = Some(header.name);
                    record.index = Some(header.index);
                }
                warn!(offset, tag, kind = ?kind, error = %err, "dropping malformed column");
                record.outcome = ColumnOutcome::Malformed(err.to_string());
            }
        }
        self.columns.push(record);
        Ok(())
    }

    fn register(&mut self, column: Column, resolved: &mut Option<Field>) -> ColumnOutcome {
        if column.kind == ColumnKind::Unknown {
            debug!(tag = column.tag, name = column.header.name.as_str(), "column type has no decoder");
        }
        let Some(table_kind) = self.current_table else {
            return ColumnOutcome::NoCurrentTable;
        };
        let Some(field) = Field::resolve(table_kind, column.header.index) else {
            debug!(
                table = table_kind.as_str(),
                index = column.header.index,
                name = column.header.name.as_str(),
                "no field for column index"
            );
            return ColumnOutcome::UnknownField;
        };
        *resolved = Some(field);
        let table = self
            .tables
            .entry(table_kind)
            .or_insert_with(|| Table::new(table_kind));
        if table.has_field(field) {
            debug!(field = field.name(), "keeping first column for field");
            return ColumnOutcome::Duplicate;
        }
        if let Some(unit) = column.unit() {
            let slot = match field.class() {
                FieldClass::Duration => Some(&mut self.duration_unit),
                FieldClass::Work => Some(&mut self.work_unit),
                FieldClass::Plain => None,
            };
            if let Some(slot) = slot {
                slot.get_or_insert(unit);
            }
        }
        table.add_column(field, column.data.into_values());
        ColumnOutcome::Registered
    }

    fn finish(self) -> ScanOutput {
        ScanOutput {
            tables: self.tables,
            duration_unit: self.duration_unit,
            work_unit: self.work_unit,
            blocks: self.blocks,
            columns: self.columns,
        }
    }
}

/// Decodes every block of `buf` in file order.
pub fn scan(buf: &[u8], policy: ColumnErrorPolicy) -> Result<ScanOutput, Error> {
    let ranges = find_blocks(buf)?;
    debug!(len = buf.len(), blocks = ranges.len(), "framed file");
    let mut state = ScanState::new(policy);
    for range in ranges {
        match BlockKind::classify(range.len()) {
            BlockKind::TableDefinition => state.table_block(buf, range)?,
            BlockKind::ColumnContainer => state.column_block(buf, range)?,
        }
    }
    Ok(state.finish())
}

//! Purpose: Public entry points that load a FastTrack file and decode it in one pass.
//! Exports: `read_bytes`, `read_bytes_with`, `read_path`, `read_path_with`, `ReadOptions`, `FastTrackData`.
//! Role: Boundary between callers and the scanner; attaches paths to errors.
//! Invariants: Files are read wholesale before decoding; decoding never touches the filesystem.
//! Invariants: The same bytes and options always produce equal `FastTrackData`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::report::DecodeReport;
use crate::core::bytes::TimeUnit;
use crate::core::error::{Error, io_error_kind};
use crate::core::field::TableKind;
use crate::core::scan::{self, BlockExtent, ColumnErrorPolicy, ColumnRecord};
use crate::core::table::{Row, Table};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadOptions {
    pub column_errors: ColumnErrorPolicy,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_errors(mut self, policy: ColumnErrorPolicy) -> Self {
        self.column_errors = policy;
        self
    }
}

/// Everything recovered from one file.
#[derive(Clone, Debug)]
pub struct FastTrackData {
    tables: BTreeMap<TableKind, Table>,
    duration_unit: Option<TimeUnit>,
    work_unit: Option<TimeUnit>,
    blocks: Vec<BlockExtent>,
    columns: Vec<ColumnRecord>,
    report: DecodeReport,
}

impl FastTrackData {
    pub fn table(&self, kind: TableKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    /// Rows of `kind`, empty when the file never defined that table.
    pub fn rows(&self, kind: TableKind) -> &[Row] {
        self.table(kind).map(Table::rows).unwrap_or(&[])
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Unit of the first duration column with an informative unit byte.
    pub fn duration_unit(&self) -> Option<TimeUnit> {
        self.duration_unit
    }

    pub fn work_unit(&self) -> Option<TimeUnit> {
        self.work_unit
    }

    pub fn blocks(&self) -> &[BlockExtent] {
        &self.blocks
    }

    pub fn columns(&self) -> &[ColumnRecord] {
        &self.columns
    }

    pub fn report(&self) -> &DecodeReport {
        &self.report
    }
}

pub fn read_bytes(buf: &[u8]) -> Result<FastTrackData, Error> {
    read_bytes_with(buf, ReadOptions::default())
}

pub fn read_bytes_with(buf: &[u8], options: ReadOptions) -> Result<FastTrackData, Error> {
    let output = scan::scan(buf, options.column_errors)?;
    let report = DecodeReport::from_columns(output.blocks.len(), &output.columns);
    Ok(FastTrackData {
        tables: output.tables,
        duration_unit: output.duration_unit,
        work_unit: output.work_unit,
        blocks: output.blocks,
        columns: output.columns,
        report,
    })
}

pub fn read_path(path: impl AsRef<Path>) -> Result<FastTrackData, Error> {
    read_path_with(path, ReadOptions::default())
}

pub fn read_path_with(path: impl AsRef<Path>, options: ReadOptions) -> Result<FastTrackData, Error> {
    let path = path.as_ref();
    let buf = fs::read(path).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to read file")
            .with_path(path)
            .with_source(err)
    })?;
    debug!(path = %path.display(), len = buf.len(), "loaded file");
    read_bytes_with(&buf, options).map_err(|err| err.with_path(path))
}

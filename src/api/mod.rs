//! Purpose: Define the stable public Rust API for reading FastTrack files.
//! Exports: Reader entry points, decoded tables and values, field identities, and reports.
//! Role: Public, additive-only surface; the CLI uses nothing else.
//! Invariants: Framing and decoder internals stay reachable only through `core`.

mod reader;
mod report;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::bytes::TimeUnit;
pub use crate::core::column::ColumnKind;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::field::{Field, FieldClass, TableKind};
pub use crate::core::scan::{BlockExtent, BlockKind, ColumnErrorPolicy, ColumnOutcome, ColumnRecord};
pub use crate::core::table::{Row, Table, Value};
pub use reader::{FastTrackData, ReadOptions, read_bytes, read_bytes_with, read_path, read_path_with};
pub use report::{ColumnIssue, DecodeReport, ReportStatus};

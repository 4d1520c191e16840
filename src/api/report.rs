//! Purpose: Summarize what a read kept and what it dropped, column by column.
//! Exports: `DecodeReport`, `ReportStatus`, `ColumnIssue`.
//! Role: Shared contract for CLI diagnostics and library callers checking partial reads.
//! Invariants: Every column the scanner did not register appears as exactly one issue.
//! Invariants: Status is `Degraded` only when at least one column was malformed.

use crate::core::field::TableKind;
use crate::core::scan::{ColumnOutcome, ColumnRecord};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportStatus {
    Clean,
    Degraded,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnIssue {
    pub code: &'static str,
    pub message: String,
    pub offset: u64,
    pub block: usize,
    pub tag: u8,
    pub name: Option<String>,
    pub table: Option<TableKind>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeReport {
    pub status: ReportStatus,
    pub block_count: usize,
    pub columns_seen: usize,
    pub columns_registered: usize,
    pub malformed_count: usize,
    pub issues: Vec<ColumnIssue>,
}

impl DecodeReport {
    pub fn from_columns(block_count: usize, columns: &[ColumnRecord]) -> Self {
        let issues: Vec<ColumnIssue> = columns.iter().filter_map(issue).collect();
        let malformed_count = issues.iter().filter(|issue| issue.code == "malformed").count();
        let status = if malformed_count == 0 {
            ReportStatus::Clean
        } else {
            ReportStatus::Degraded
        };
        Self {
            status,
            block_count,
            columns_seen: columns.len(),
            columns_registered: columns.len() - issues.len(),
            malformed_count,
            issues,
        }
    }

    pub fn malformed(&self) -> impl Iterator<Item = &ColumnIssue> {
        self.issues.iter().filter(|issue| issue.code == "malformed")
    }
}

fn issue(record: &ColumnRecord) -> Option<ColumnIssue> {
    let (code, message) = match &record.outcome {
        ColumnOutcome::Registered => return None,
        ColumnOutcome::Malformed(message) => ("malformed", message.clone()),
        ColumnOutcome::NoCurrentTable => ("no_table", "column outside a recognized table".to_string()),
        ColumnOutcome::UnknownField => (
            "unknown_field",
            format!("no field for column index {}", record.index.unwrap_or_default()),
        ),
        ColumnOutcome::Duplicate => ("duplicate", "field already populated".to_string()),
    };
    Some(ColumnIssue {
        code,
        message,
        offset: record.offset as u64,
        block: record.block,
        tag: record.tag,
        name: record.name.clone(),
        table: record.table,
    })
}

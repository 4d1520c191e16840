//! Purpose: Shared JSON serializers for decoded rows, block layouts, and decode reports.
//! Exports: `data_json`, `blocks_json`, `report_json`, `value_json`.
//! Role: Keep CLI output envelopes consistent across commands.
//! Invariants: Row objects are keyed by `Field::key` and omit null fields.
//! Invariants: Dates render as `YYYY-MM-DD`, times as `HH:MM`.

use fasttrack::api::{
    BlockExtent, BlockKind, ColumnOutcome, ColumnRecord, DecodeReport, FastTrackData, ReportStatus,
    Row, Table, TableKind, Value,
};
use serde_json::{Map, Value as Json, json};
use time::macros::format_description;

pub(crate) fn value_json(value: &Value) -> Json {
    match value {
        Value::Text(text) => json!(text),
        Value::Integer(value) => json!(value),
        Value::Number(value) => json!(value),
        Value::Boolean(value) => json!(value),
        Value::Date(date) => date
            .format(format_description!("[year]-[month]-[day]"))
            .map(Json::String)
            .unwrap_or(Json::Null),
        Value::Time(time) => time
            .format(format_description!("[hour]:[minute]"))
            .map(Json::String)
            .unwrap_or(Json::Null),
        Value::Duration { value, unit } => json!({ "value": value, "unit": unit }),
        Value::Bytes(bytes) => json!(hex(bytes)),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn row_json(row: &Row) -> Json {
    let mut map = Map::new();
    for (field, value) in row.iter() {
        map.insert(field.key(), value_json(value));
    }
    Json::Object(map)
}

fn table_json(table: &Table) -> Json {
    let fields = table.fields().map(|field| field.key()).collect::<Vec<_>>();
    let rows = table.rows().iter().map(row_json).collect::<Vec<_>>();
    json!({
        "table": table.kind(),
        "fields": fields,
        "row_count": table.len(),
        "rows": rows,
    })
}

pub(crate) fn data_json(data: &FastTrackData, only: Option<TableKind>) -> Json {
    let tables = data
        .tables()
        .filter(|table| only.is_none_or(|kind| kind == table.kind()))
        .map(table_json)
        .collect::<Vec<_>>();
    json!({
        "duration_unit": data.duration_unit(),
        "work_unit": data.work_unit(),
        "tables": tables,
    })
}

fn outcome_str(outcome: &ColumnOutcome) -> &'static str {
    match outcome {
        ColumnOutcome::Registered => "registered",
        ColumnOutcome::NoCurrentTable => "no_table",
        ColumnOutcome::UnknownField => "unknown_field",
        ColumnOutcome::Duplicate => "duplicate",
        ColumnOutcome::Malformed(_) => "malformed",
    }
}

fn column_json(column: &ColumnRecord) -> Json {
    let mut map = Map::new();
    map.insert("offset".to_string(), json!(column.offset));
    map.insert("len".to_string(), json!(column.len));
    map.insert("tag".to_string(), json!(format!("0x{:02X}", column.tag)));
    map.insert("kind".to_string(), json!(column.kind));
    if let Some(name) = &column.name {
        map.insert("name".to_string(), json!(name));
    }
    if let Some(index) = column.index {
        map.insert("index".to_string(), json!(index));
    }
    if let Some(field) = column.field {
        map.insert("field".to_string(), json!(field.key()));
    }
    map.insert("values".to_string(), json!(column.values));
    map.insert("outcome".to_string(), json!(outcome_str(&column.outcome)));
    if let ColumnOutcome::Malformed(message) = &column.outcome {
        map.insert("error".to_string(), json!(message));
    }
    Json::Object(map)
}

fn block_json(index: usize, block: &BlockExtent, columns: &[ColumnRecord]) -> Json {
    let mut map = Map::new();
    map.insert("start".to_string(), json!(block.start));
    map.insert("end".to_string(), json!(block.end));
    map.insert("len".to_string(), json!(block.len()));
    let kind = match block.kind {
        BlockKind::TableDefinition => "table_definition",
        BlockKind::ColumnContainer => "column_container",
    };
    map.insert("kind".to_string(), json!(kind));
    if let Some(name) = &block.table_name {
        map.insert("declared_name".to_string(), json!(name));
    }
    map.insert("table".to_string(), json!(block.table));
    if block.kind == BlockKind::ColumnContainer {
        let columns = columns
            .iter()
            .filter(|column| column.block == index)
            .map(column_json)
            .collect::<Vec<_>>();
        map.insert("columns".to_string(), Json::Array(columns));
    }
    Json::Object(map)
}

pub(crate) fn blocks_json(data: &FastTrackData) -> Json {
    let blocks = data
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| block_json(index, block, data.columns()))
        .collect::<Vec<_>>();
    json!({ "blocks": blocks })
}

pub(crate) fn report_json(file: &str, report: &DecodeReport) -> Json {
    let status = match report.status {
        ReportStatus::Clean => "clean",
        ReportStatus::Degraded => "degraded",
    };
    let issues = report
        .issues
        .iter()
        .map(|issue| {
            json!({
                "code": issue.code,
                "message": issue.message,
                "offset": issue.offset,
                "block": issue.block,
                "tag": format!("0x{:02X}", issue.tag),
                "column": issue.name,
                "table": issue.table,
            })
        })
        .collect::<Vec<_>>();
    json!({
        "file": file,
        "status": status,
        "blocks": report.block_count,
        "columns_seen": report.columns_seen,
        "columns_registered": report.columns_registered,
        "malformed": report.malformed_count,
        "issues": issues,
    })
}

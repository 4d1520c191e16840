//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `column_notice`.
//! Role: Shared contract for CLI diagnostics about columns a read dropped.
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

use crate::api::ColumnIssue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub cmd: String,
    pub file: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("file".to_string(), json!(notice.file));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn column_notice(cmd: &str, file: &str, issue: &ColumnIssue) -> Notice {
    let mut details = Map::new();
    details.insert("offset".to_string(), json!(issue.offset));
    details.insert("block".to_string(), json!(issue.block));
    details.insert("tag".to_string(), json!(issue.tag));
    if let Some(name) = &issue.name {
        details.insert("column".to_string(), json!(name));
    }
    if let Some(table) = issue.table {
        details.insert("table".to_string(), json!(table.as_str()));
    }
    Notice {
        kind: issue.code.to_string(),
        cmd: cmd.to_string(),
        file: file.to_string(),
        message: issue.message.clone(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::{column_notice, notice_json};
    use crate::api::{ColumnIssue, TableKind};

    #[test]
    fn notice_json_has_required_fields() {
        let issue = ColumnIssue {
            code: "malformed",
            message: "Malformed: item count 200000 out of range".to_string(),
            offset: 412,
            block: 2,
            tag: 0x4A,
            name: Some("Finish Date".to_string()),
            table: Some(TableKind::Activities),
        };
        let value = notice_json(&column_notice("dump", "plan.fts", &issue));
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("malformed"));
        assert_eq!(obj.get("cmd").and_then(|v| v.as_str()), Some("dump"));
        assert_eq!(obj.get("file").and_then(|v| v.as_str()), Some("plan.fts"));
        let details = obj.get("details").and_then(|v| v.as_object()).expect("details");
        assert_eq!(details.get("offset").and_then(|v| v.as_u64()), Some(412));
        assert_eq!(details.get("column").and_then(|v| v.as_str()), Some("Finish Date"));
        assert_eq!(details.get("table").and_then(|v| v.as_str()), Some("activities"));
    }
}

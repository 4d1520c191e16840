// Row assembly: decoded columns are zipped positionally into ordered rows per table.
use std::collections::{BTreeMap, BTreeSet};

use time::{Date, Time};

use crate::core::bytes::TimeUnit;
use crate::core::field::{Field, TableKind};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(Date),
    Time(Time),
    Duration { value: f64, unit: Option<TimeUnit> },
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) | Value::Duration { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// One record; a missing field is null.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<Field, Value>,
}

impl Row {
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    kind: TableKind,
    rows: Vec<Row>,
    fields: BTreeSet<Field>,
}

impl Table {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            fields: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Fields in the order they are numbered on disk.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    /// Row `i` receives `values[i]`; rows are created as needed, never skipped.
    pub fn add_column(&mut self, field: Field, values: Vec<Option<Value>>) {
        self.fields.insert(field);
        for (idx, value) in values.into_iter().enumerate() {
            if idx == self.rows.len() {
                self.rows.push(Row::default());
            }
            if let Some(value) = value {
                self.rows[idx].values.insert(field, value);
            }
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Search result rows as they come back from the logging service.
//!
//! Every row is a JSON object in one of two shapes. Raw log records wrap
//! their payload in a `logContent` object; aggregate rows (produced by
//! `summarize`-style queries) are flat maps of group keys and metric values.
//! [`LogRow::from_value`] tells them apart by the presence of `logContent`
//! and fails closed on anything that is not an object.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::field::FieldKind;

/// Key that marks a row as a raw log record.
pub const CONTENT_KEY: &str = "logContent";

/// Reserved keys inside `logContent` with dedicated handling.
pub const TIME_KEY: &str = "time";
pub const DATA_KEY: &str = "data";
pub const ORACLE_KEY: &str = "oracle";
pub const SUBJECT_KEY: &str = "subject";

/// A row that could not be interpreted. Non-fatal: callers skip the row and
/// keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("search result row is not a JSON object")]
    NotAnObject,
    #[error("`logContent` is present but is not a JSON object")]
    MalformedContent,
}

/// One decoded search result row.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRow {
    Content(ContentRow),
    Aggregate(AggregateRow),
}

impl LogRow {
    /// Decode a raw JSON row. The `logContent` wrapper decides the variant;
    /// rows that are not objects, or whose `logContent` is not an object,
    /// are rejected.
    pub fn from_value(value: Value) -> Result<LogRow, RowError> {
        let Value::Object(mut entries) = value else {
            return Err(RowError::NotAnObject);
        };
        match entries.remove(CONTENT_KEY) {
            Some(Value::Object(content)) => Ok(LogRow::Content(ContentRow { entries: content })),
            Some(_) => Err(RowError::MalformedContent),
            None => Ok(LogRow::Aggregate(AggregateRow { entries })),
        }
    }
}

/// The `logContent` payload of a raw log record.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRow {
    entries: Map<String, Value>,
}

impl ContentRow {
    /// Iterate the payload entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

/// A flat aggregate row: group-by keys plus one numeric metric value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    entries: Map<String, Value>,
}

impl AggregateRow {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Keys in sorted order, which makes derived orderings (label field
    /// lists, composite keys) deterministic for a given row shape.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Epoch-millisecond value of a bucket key. Integer-form JSON numbers
    /// are taken as-is; float-form ones are truncated toward zero. Missing
    /// or non-numeric values yield `None`.
    pub fn timestamp_ms(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            Value::Number(n) if n.is_f64() => n.as_f64().map(|f| f as i64),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Label value for the composite series key. Missing and JSON-null
    /// values both collapse to the literal string `"null"`; non-string
    /// scalars keep their JSON text form.
    pub fn label_value(&self, key: &str) -> String {
        match self.entries.get(key) {
            None | Some(Value::Null) => "null".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Column kind implied by a JSON value: integer-form numbers map to int
/// columns, float-form to float columns, everything else to nothing.
pub fn numeric_kind(value: &Value) -> Option<FieldKind> {
    match value {
        Value::Number(n) if n.is_f64() => Some(FieldKind::Float),
        Value::Number(_) => Some(FieldKind::Int),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

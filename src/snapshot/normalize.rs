//! Index normalization
//!
//! Turns a raw JSON payload into a sorted list of entries:
//!
//! ```text
//!   body → parse_index_body → SnapshotIndex → entries → sort_entries
//! ```

use serde_json::Value;

use super::error::{IndexError, IndexResult};
use super::types::{SnapshotIndex, SnapshotIndexEntry};

/// Parse a response body into an index document
pub fn parse_index_body(body: &str) -> IndexResult<SnapshotIndex> {
    let raw: Value = serde_json::from_str(body)?;
    classify(raw)
}

/// Classify a JSON value as one of the accepted index shapes.
///
/// Anything that is neither an array nor an object with a `days` array is
/// rejected rather than treated as empty.
pub fn classify(raw: Value) -> IndexResult<SnapshotIndex> {
    match raw {
        Value::Array(items) => Ok(SnapshotIndex::Entries(items)),
        Value::Object(mut map) => match map.remove("days") {
            Some(Value::Array(items)) => Ok(SnapshotIndex::Days(items)),
            Some(other) => Err(IndexError::Schema(format!(
                "\"days\" must be an array, found {}",
                json_type(&other)
            ))),
            None => Err(IndexError::Schema(
                "object without a \"days\" array".to_string(),
            )),
        },
        other => Err(IndexError::Schema(format!(
            "expected an array or an object, found {}",
            json_type(&other)
        ))),
    }
}

/// Normalize a raw payload into entries, in payload order.
///
/// Items without a string `date` are dropped; nothing else is filtered.
pub fn normalize(raw: &Value) -> IndexResult<Vec<SnapshotIndexEntry>> {
    let index = classify(raw.clone())?;
    Ok(entries(&index))
}

/// Entries of an already classified index, in payload order
pub fn entries(index: &SnapshotIndex) -> Vec<SnapshotIndexEntry> {
    let items = index.items();
    let entries: Vec<_> = items.iter().filter_map(entry_from_value).collect();

    let dropped = items.len() - entries.len();
    if dropped > 0 {
        tracing::warn!(
            shape = index.shape(),
            dropped,
            "Dropped index items without a date"
        );
    }

    entries
}

/// Build an entry from one index item.
///
/// Accepts an object with a string `date` or a bare date string. Optional
/// fields of the wrong type are treated as absent.
fn entry_from_value(item: &Value) -> Option<SnapshotIndexEntry> {
    match item {
        Value::String(date) if !date.is_empty() => Some(SnapshotIndexEntry::new(date.as_str())),
        Value::Object(map) => {
            let date = map.get("date")?.as_str().filter(|d| !d.is_empty())?;
            Some(SnapshotIndexEntry {
                date: date.to_string(),
                source: map
                    .get("source")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                count: map.get("count").and_then(Value::as_u64),
                file: map.get("file").and_then(Value::as_str).map(str::to_string),
            })
        }
        _ => None,
    }
}

/// Sort entries newest first.
///
/// Lexical order on zero-padded ISO dates is chronological. The sort is
/// stable, so equal dates keep their payload order.
pub fn sort_entries(entries: &mut [SnapshotIndexEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Unwrapping of source response envelopes into flat row sets.
//!
//! Supported shapes:
//! - OData V2 collections: `{"d": {"results": [...]}}`
//! - OData V2 single entities: `{"d": {...}}`
//! - OData V4 collections: `{"@odata.context": ..., "value": [...]}`
//! - a bare array of records, or a bare record

use serde_json::Value;

use crate::error::SourceError;
use crate::source::{Row, RowSet};

/// Turn a raw payload into rows, in source order.
pub fn unwrap_rows(payload: Value) -> Result<RowSet, SourceError> {
    match payload {
        Value::Array(items) => rows_from_items(items),
        Value::Object(mut map) => {
            match map.remove("d") {
                Some(Value::Object(mut d)) => {
                    return match d.remove("results") {
                        Some(results) => rows_from_value(results),
                        None => Ok(vec![d]),
                    };
                }
                Some(Value::Array(items)) => return rows_from_items(items),
                Some(other) => {
                    map.insert("d".to_string(), other);
                }
                None => {}
            }

            if is_v4_collection(&map) {
                if let Some(value) = map.remove("value") {
                    return rows_from_value(value);
                }
            }

            Ok(vec![map])
        }
        other => Err(SourceError::MalformedPayload(format!(
            "expected an object or array, got {}",
            kind(&other)
        ))),
    }
}

fn is_v4_collection(map: &Row) -> bool {
    matches!(map.get("value"), Some(Value::Array(_)))
        && (map.len() == 1 || map.keys().any(|k| k.starts_with("@odata.")))
}

fn rows_from_value(value: Value) -> Result<RowSet, SourceError> {
    match value {
        Value::Array(items) => rows_from_items(items),
        other => Err(SourceError::MalformedPayload(format!(
            "expected a results array, got {}",
            kind(&other)
        ))),
    }
}

fn rows_from_items(items: Vec<Value>) -> Result<RowSet, SourceError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(row) => Ok(row),
            other => Err(SourceError::MalformedPayload(format!(
                "row {} is {}, not an object",
                index,
                kind(&other)
            ))),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

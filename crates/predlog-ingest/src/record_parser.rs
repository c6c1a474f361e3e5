//! Fail-soft decoding of JSON object cells.
//!
//! Prediction and outcome exports embed JSON objects inside CSV cells. The
//! data is produced upstream and is partially malformed, so a bad cell must
//! never abort a run: it decodes to an empty mapping instead.

use std::collections::BTreeMap;

use tracing::trace;

use predlog_model::FieldValue;

/// Decoded JSON object: key to tagged value.
pub type Record = BTreeMap<String, FieldValue>;

/// Decodes a JSON object cell, returning `None` when the cell is absent, is
/// not valid JSON, or holds a JSON value other than an object.
pub fn try_parse_json_object(raw: Option<&str>) -> Option<Record> {
    let raw = raw?;
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Some(
            map.into_iter()
                .map(|(key, value)| (key, FieldValue::from_json(value)))
                .collect(),
        ),
        Ok(other) => {
            trace!(kind = json_kind(&other), "json cell is not an object");
            None
        }
        Err(error) => {
            trace!(%error, "malformed json cell");
            None
        }
    }
}

/// Decodes a JSON object cell, substituting an empty mapping on failure.
pub fn parse_json_object(raw: Option<&str>) -> Record {
    try_parse_json_object(raw).unwrap_or_default()
}

/// Decodes the JSON object held by a table cell.
pub fn parse_cell(value: &FieldValue) -> Option<Record> {
    match value {
        FieldValue::Text(raw) => try_parse_json_object(Some(raw)),
        FieldValue::Nested(serde_json::Value::Object(map)) => Some(
            map.iter()
                .map(|(key, value)| (key.clone(), FieldValue::from_json(value.clone())))
                .collect(),
        ),
        _ => None,
    }
}

/// Interprets a boolean flag cell. Accepts `true/false`, `t/f`, `yes/no`,
/// `y/n` and `1/0` in any case.
pub fn parse_flag(value: &FieldValue) -> Option<bool> {
    match value {
        FieldValue::Bool(b) => Some(*b),
        FieldValue::Number(n) => Some(*n != 0.0),
        FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
            "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
            _ => None,
        },
        FieldValue::Null | FieldValue::Nested(_) => None,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

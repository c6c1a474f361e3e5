//! Cell values.
//!
//! Source CSV cells arrive as text; values decoded from JSON payloads keep
//! their JSON type so downstream code can tell an explicit null from an absent
//! key (absent keys never become a [`FieldValue`]) and a number from a string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A JSON array or object kept as-is.
    Nested(serde_json::Value),
}

impl FieldValue {
    /// Converts a decoded JSON value into its tagged form.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Self::Nested(nested)
            }
        }
    }

    /// Wraps a raw text cell; blank text is treated as null.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Null
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value. Text is parsed, booleans map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) => parse_f64(s),
            Self::Null | Self::Nested(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value for CSV output and display. Null renders empty.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(v) => format_numeric(*v),
            Self::Text(s) => s.clone(),
            Self::Nested(v) => v.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Formats a float without a trailing `.0` for whole numbers.
pub fn format_numeric(v: f64) -> String {
    format!("{v}")
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_keep_their_type() {
        assert_eq!(FieldValue::from_json(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(json!(true)), FieldValue::Bool(true));
        assert_eq!(FieldValue::from_json(json!(3)), FieldValue::Number(3.0));
        assert_eq!(
            FieldValue::from_json(json!("mobile")),
            FieldValue::Text("mobile".to_string())
        );
        assert!(matches!(
            FieldValue::from_json(json!({"a": 1})),
            FieldValue::Nested(_)
        ));
    }

    #[test]
    fn blank_cells_are_null() {
        assert!(FieldValue::from_cell("   ").is_null());
        assert_eq!(FieldValue::from_cell(" p1 "), FieldValue::from("p1"));
    }

    #[test]
    fn numeric_view() {
        assert_eq!(FieldValue::from("0.75").as_f64(), Some(0.75));
        assert_eq!(FieldValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(FieldValue::from("abc").as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
    }

    #[test]
    fn display_strings() {
        assert_eq!(FieldValue::Number(1.0).to_display_string(), "1");
        assert_eq!(FieldValue::Number(10.0).to_display_string(), "10");
        assert_eq!(FieldValue::Number(0.25).to_display_string(), "0.25");
        assert_eq!(FieldValue::Null.to_display_string(), "");
        assert_eq!(
            FieldValue::Nested(serde_json::json!([1, 2])).to_display_string(),
            "[1,2]"
        );
    }
}

//! Timestamp normalization to whole seconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use predlog_model::{FieldValue, parse_f64};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses a timestamp into epoch seconds. Sub-second precision is dropped,
/// never rounded up. Naive date-times are read as UTC.
pub fn parse_epoch_seconds(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(seconds) = parse_f64(trimmed) {
        return seconds.is_finite().then(|| seconds.floor() as i64);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp());
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Some(parsed.timestamp());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Normalizes one cell. Returns `None` when the cell holds a value that is
/// not a recognizable timestamp; null stays null.
pub fn normalize_timestamp(value: &FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Null => Some(FieldValue::Null),
        FieldValue::Number(n) if n.is_finite() => Some(FieldValue::Number(n.floor())),
        FieldValue::Text(raw) => parse_epoch_seconds(raw).map(FieldValue::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_formats() {
        assert_eq!(parse_epoch_seconds("2024-01-15 10:00:00"), Some(1_705_312_800));
        assert_eq!(parse_epoch_seconds("2024-01-15T10:00:00"), Some(1_705_312_800));
        assert_eq!(parse_epoch_seconds("2024-01-15T10:00:00Z"), Some(1_705_312_800));
        assert_eq!(
            parse_epoch_seconds("2024-01-15T12:00:00+02:00"),
            Some(1_705_312_800)
        );
        assert_eq!(parse_epoch_seconds("2024-01-15"), Some(1_705_276_800));
        assert_eq!(parse_epoch_seconds("1705312800"), Some(1_705_312_800));
    }

    #[test]
    fn truncates_sub_second_precision() {
        assert_eq!(
            parse_epoch_seconds("2024-01-15 10:00:00.999"),
            Some(1_705_312_800)
        );
        assert_eq!(
            parse_epoch_seconds("2024-01-15T10:00:00.999999Z"),
            Some(1_705_312_800)
        );
        assert_eq!(parse_epoch_seconds("1705312800.9"), Some(1_705_312_800));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_epoch_seconds("yesterday"), None);
        assert_eq!(parse_epoch_seconds(""), None);
        assert_eq!(normalize_timestamp(&FieldValue::from("later")), None);
    }

    #[test]
    fn normalize_keeps_null_and_floors_numbers() {
        assert_eq!(
            normalize_timestamp(&FieldValue::Null),
            Some(FieldValue::Null)
        );
        assert_eq!(
            normalize_timestamp(&FieldValue::Number(12.7)),
            Some(FieldValue::Number(12.0))
        );
    }
}

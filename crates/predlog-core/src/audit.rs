//! Data quality metrics over raw prediction tables.
//!
//! Every metric is informational: the auditor never drops rows. A missing
//! column is the only failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use predlog_ingest::{parse_cell, parse_flag};
use predlog_model::{ColumnLayout, FieldValue, Result, Table};

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Fraction of rows whose flag column is true. Unreadable flags count as
/// false.
pub fn missing_required_rate(table: &Table, flag_column: &str) -> Result<f64> {
    let idx = table.require_column(flag_column)?;
    let flagged = table
        .column_values(idx)
        .filter(|value| parse_flag(value) == Some(true))
        .count();
    Ok(ratio(flagged, table.height()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NullOutcomeRate {
    pub null_count: usize,
    pub total: usize,
    pub rate: f64,
}

/// Rows whose payload carries no usable outcome: undecodable payload, absent
/// key or explicit null all count the same.
pub fn null_outcome_rate(
    table: &Table,
    payload_column: &str,
    outcome_key: &str,
) -> Result<NullOutcomeRate> {
    let idx = table.require_column(payload_column)?;
    let null_count = table
        .column_values(idx)
        .filter(|cell| {
            parse_cell(cell)
                .and_then(|mut record| record.remove(outcome_key))
                .is_none_or(|value| value.is_null())
        })
        .count();
    let total = table.height();
    Ok(NullOutcomeRate {
        null_count,
        total,
        rate: ratio(null_count, total),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNullRate {
    pub feature: String,
    pub null_count: usize,
    /// `null_count` over the full table height, not over rows carrying the key.
    pub rate: f64,
}

/// Explicit-null rate for every key seen in any `features` cell, sorted by
/// feature name.
pub fn feature_null_rates(table: &Table, features_column: &str) -> Result<Vec<FeatureNullRate>> {
    let idx = table.require_column(features_column)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cell in table.column_values(idx) {
        let Some(record) = parse_cell(cell) else {
            continue;
        };
        for (key, value) in record {
            let count = counts.entry(key).or_default();
            if matches!(value, FieldValue::Null) {
                *count += 1;
            }
        }
    }
    let total = table.height();
    Ok(counts
        .into_iter()
        .map(|(feature, null_count)| FeatureNullRate {
            feature,
            null_count,
            rate: ratio(null_count, total),
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub table: String,
    pub rows: usize,
    pub missing_required_rate: f64,
    pub null_outcomes: NullOutcomeRate,
    pub feature_null_rates: Vec<FeatureNullRate>,
}

/// Runs every metric against a prediction table.
pub fn audit_table(table: &Table, layout: &ColumnLayout) -> Result<QualityReport> {
    let missing = missing_required_rate(table, &layout.missing_required)?;
    let null_outcomes = null_outcome_rate(
        table,
        &layout.prediction_payload,
        &layout.payload_keys.binarized_outcome,
    )?;
    let features = feature_null_rates(table, &layout.features)?;
    debug!(features = features.len(), "collected feature null rates");

    info!(
        table = table.name(),
        rows = table.height(),
        missing_required_rate = missing,
        null_outcome_rate = null_outcomes.rate,
        "quality audit complete"
    );

    Ok(QualityReport {
        table: table.name().to_string(),
        rows: table.height(),
        missing_required_rate: missing,
        null_outcomes,
        feature_null_rates: features,
    })
}

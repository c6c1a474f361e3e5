//! Descriptive statistics for reporting.
//!
//! Works on any table that exposes a numeric score column and a binary label
//! column: a reconciled table, or a flat export that already has them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use predlog_model::{
    BINARIZED_OUTCOME_COLUMN, BINARIZED_PREDICTION_COLUMN, ColumnLayout, FieldValue,
    OUTCOME_SUFFIX, PREDICTION_VALUE_COLUMN, Result, Table,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    pub score_column: String,
    pub label_column: String,
    pub timestamp_column: Option<String>,
    /// Columns to summarize. Empty means the table's flattened feature
    /// columns, or every unbound column when the table has none.
    pub feature_columns: Vec<String>,
    /// Columns never picked up as features when `feature_columns` is empty.
    pub skip_columns: Vec<String>,
    /// Category counts kept per categorical feature.
    pub max_categories: usize,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            score_column: PREDICTION_VALUE_COLUMN.to_string(),
            label_column: BINARIZED_OUTCOME_COLUMN.to_string(),
            timestamp_column: None,
            feature_columns: Vec::new(),
            skip_columns: Vec::new(),
            max_categories: 10,
        }
    }
}

impl AnalyticsOptions {
    /// Skips the identifier, timestamp, raw JSON, flag and derived label
    /// columns of `layout` when falling back to unbound columns.
    pub fn skipping_layout(mut self, layout: &ColumnLayout) -> Self {
        self.skip_columns.extend([
            layout.record_id.clone(),
            layout.timestamp.clone(),
            layout.features.clone(),
            layout.prediction_payload.clone(),
            layout.outcome_payload.clone(),
            format!("{}{OUTCOME_SUFFIX}", layout.outcome_payload),
            layout.missing_required.clone(),
            PREDICTION_VALUE_COLUMN.to_string(),
            BINARIZED_PREDICTION_COLUMN.to_string(),
            BINARIZED_OUTCOME_COLUMN.to_string(),
        ]);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampRange {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSummary {
    Numeric {
        name: String,
        count: usize,
        mean: f64,
        min: f64,
        max: f64,
    },
    Categorical {
        name: String,
        count: usize,
        distinct: usize,
        /// Most frequent first; ties broken by value.
        top: Vec<CategoryCount>,
    },
}

impl FeatureSummary {
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name, .. } | Self::Categorical { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_rows: usize,
    /// Rows with both a numeric score and a numeric label.
    pub scored_rows: usize,
    /// Share of scored rows whose score, rounded half to even, equals the label.
    pub accuracy: Option<f64>,
    pub mean_score: Option<f64>,
    pub base_rate: Option<f64>,
    pub timestamp_range: Option<TimestampRange>,
    pub features: Vec<FeatureSummary>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Computes the summary. Null cells are skipped everywhere.
pub fn describe(table: &Table, options: &AnalyticsOptions) -> Result<AnalyticsSummary> {
    let score_idx = table.require_column(&options.score_column)?;
    let label_idx = table.require_column(&options.label_column)?;
    let timestamp_idx = options
        .timestamp_column
        .as_deref()
        .map(|name| table.require_column(name))
        .transpose()?;

    let scores: Vec<f64> = table
        .column_values(score_idx)
        .filter_map(FieldValue::as_f64)
        .collect();
    let labels: Vec<f64> = table
        .column_values(label_idx)
        .filter_map(FieldValue::as_f64)
        .collect();

    let pairs: Vec<(f64, f64)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let score = row.get(score_idx).as_f64()?;
            let label = row.get(label_idx).as_f64()?;
            Some((score, label))
        })
        .collect();
    let accuracy = if pairs.is_empty() {
        None
    } else {
        let hits = pairs
            .iter()
            .filter(|(score, label)| score.round_ties_even() == *label)
            .count();
        Some(hits as f64 / pairs.len() as f64)
    };

    let timestamp_range = timestamp_idx.and_then(|idx| timestamp_range(table, idx));

    let mut features = Vec::new();
    for name in feature_names(table, options) {
        let idx = table.require_column(&name)?;
        features.push(summarize_feature(table, idx, name, options.max_categories));
    }

    debug!(
        rows = table.height(),
        scored = pairs.len(),
        features = features.len(),
        "computed analytics"
    );

    Ok(AnalyticsSummary {
        total_rows: table.height(),
        scored_rows: pairs.len(),
        accuracy,
        mean_score: mean(&scores),
        base_rate: mean(&labels),
        timestamp_range,
        features,
    })
}

fn feature_names(table: &Table, options: &AnalyticsOptions) -> Vec<String> {
    if !options.feature_columns.is_empty() {
        return options.feature_columns.clone();
    }
    let flattened = table.feature_columns();
    if !flattened.is_empty() {
        return flattened.into_iter().map(str::to_string).collect();
    }
    table
        .column_names()
        .filter(|name| {
            *name != options.score_column
                && *name != options.label_column
                && options.timestamp_column.as_deref() != Some(*name)
                && !options.skip_columns.iter().any(|skip| skip == name)
        })
        .map(str::to_string)
        .collect()
}

/// Numeric when every non-null cell reads as a number; booleans are
/// categorical.
fn summarize_feature(
    table: &Table,
    idx: usize,
    name: String,
    max_categories: usize,
) -> FeatureSummary {
    let present: Vec<&FieldValue> = table.column_values(idx).filter(|v| !v.is_null()).collect();
    let numbers: Option<Vec<f64>> = present
        .iter()
        .map(|value| match value {
            FieldValue::Bool(_) => None,
            other => other.as_f64(),
        })
        .collect();

    match numbers {
        Some(numbers) if !numbers.is_empty() => FeatureSummary::Numeric {
            name,
            count: numbers.len(),
            mean: mean(&numbers).unwrap_or_default(),
            min: numbers.iter().copied().fold(f64::INFINITY, f64::min),
            max: numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        },
        _ => {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for value in &present {
                *counts.entry(value.to_display_string()).or_default() += 1;
            }
            let distinct = counts.len();
            let mut top: Vec<CategoryCount> = counts
                .into_iter()
                .map(|(value, count)| CategoryCount { value, count })
                .collect();
            top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
            top.truncate(max_categories);
            FeatureSummary::Categorical {
                name,
                count: present.len(),
                distinct,
                top,
            }
        }
    }
}

/// Numeric comparison when every timestamp is numeric, lexical otherwise.
fn timestamp_range(table: &Table, idx: usize) -> Option<TimestampRange> {
    let present: Vec<&FieldValue> = table.column_values(idx).filter(|v| !v.is_null()).collect();
    let numeric: Option<Vec<f64>> = present.iter().map(|v| v.as_f64()).collect();
    if let Some(numbers) = numeric {
        let min = numbers.iter().copied().min_by(f64::total_cmp)?;
        let max = numbers.iter().copied().max_by(f64::total_cmp)?;
        return Some(TimestampRange {
            min: FieldValue::Number(min).to_display_string(),
            max: FieldValue::Number(max).to_display_string(),
        });
    }
    let texts: Vec<String> = present.iter().map(|v| v.to_display_string()).collect();
    let min = texts.iter().min()?;
    let max = texts.iter().max()?;
    Some(TimestampRange {
        min: min.clone(),
        max: max.clone(),
    })
}

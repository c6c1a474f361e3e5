//! Outcome identifier alignment.
//!
//! Rewrites an outcome table so its identifiers line up with a prediction
//! table's, position by position. Used to pair an outcome export with a
//! prediction export that were produced independently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use predlog_model::{FieldValue, Result, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Distinct non-null identifiers in the prediction table.
    pub distinct_ids: usize,
    pub outcome_rows: usize,
    /// Outcome rows dropped because there were more of them than identifiers.
    pub truncated_rows: usize,
    pub aligned_rows: usize,
}

/// Assigns the prediction table's distinct non-null identifiers, in first-seen
/// order, to the outcome rows. Surplus outcome rows are dropped. The inputs
/// are left untouched.
pub fn align_outcome_ids(
    predictions: &Table,
    outcomes: &Table,
    id_column: &str,
) -> Result<(Table, AlignmentReport)> {
    let source_idx = predictions.require_column(id_column)?;
    let target_idx = outcomes.require_column(id_column)?;

    let mut seen = HashSet::new();
    let ids: Vec<String> = predictions
        .column_values(source_idx)
        .filter(|value| !value.is_null())
        .map(FieldValue::to_display_string)
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let mut aligned = outcomes.clone();
    let mut position = 0usize;
    let truncated = aligned.retain_rows(|_| {
        position += 1;
        position <= ids.len()
    });
    let mut next = ids.iter();
    aligned.map_column(target_idx, |_| {
        next.next()
            .map_or(FieldValue::Null, |id| FieldValue::Text(id.clone()))
    });
    aligned.reindex();

    let report = AlignmentReport {
        distinct_ids: ids.len(),
        outcome_rows: outcomes.height(),
        truncated_rows: truncated,
        aligned_rows: aligned.height(),
    };
    info!(
        distinct_ids = report.distinct_ids,
        truncated_rows = report.truncated_rows,
        aligned_rows = report.aligned_rows,
        "aligned outcome identifiers"
    );
    Ok((aligned, report))
}

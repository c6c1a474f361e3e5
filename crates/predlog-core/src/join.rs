//! Inner join of the prediction and outcome tables.

use std::collections::HashMap;

use tracing::debug;

use predlog_model::{Column, FieldValue, OUTCOME_SUFFIX, Result, Table};

/// Result of joining predictions with outcomes.
#[derive(Debug, Clone)]
pub struct JoinedTable {
    pub table: Table,
    /// Name of the outcome payload column inside `table`.
    pub outcome_payload_column: String,
    /// Prediction rows without any matching outcome row.
    pub unmatched_predictions: usize,
    /// Outcome rows whose identifier matched no prediction row.
    pub unmatched_outcomes: usize,
}

fn join_key(value: &FieldValue) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(value.to_display_string())
    }
}

/// Inner-joins `predictions` with `outcomes` on `key`.
///
/// All prediction columns are kept under their own names. The outcome table
/// contributes its payload column, renamed with the outcome suffix when the
/// prediction table already has a column of that name. Duplicate keys yield
/// one row per matching pair, in prediction order then outcome order. Null
/// keys match each other; the reconciler drops those rows afterwards. When
/// the outcome table already carries a suffixed payload column, that column
/// is read instead of the plain one.
pub fn inner_join(
    predictions: &Table,
    outcomes: &Table,
    key: &str,
    outcome_payload: &str,
) -> Result<JoinedTable> {
    let left_key = predictions.require_column(key)?;
    let right_key = outcomes.require_column(key)?;
    // A reconciled table fed back in as outcomes keeps the real outcome
    // payload under the suffixed name.
    let suffixed = format!("{outcome_payload}{OUTCOME_SUFFIX}");
    let right_payload = match outcomes.column_index(&suffixed) {
        Some(idx) => idx,
        None => outcomes.require_column(outcome_payload)?,
    };

    let mut index: HashMap<Option<String>, Vec<usize>> = HashMap::new();
    for (idx, row) in outcomes.rows().iter().enumerate() {
        index.entry(join_key(row.get(right_key))).or_default().push(idx);
    }

    let outcome_payload_column = if predictions.has_column(outcome_payload) {
        suffixed
    } else {
        outcome_payload.to_string()
    };
    let payload_slot = predictions.column_index(&outcome_payload_column);

    let mut columns: Vec<Column> = predictions.columns().to_vec();
    if payload_slot.is_none() {
        columns.push(Column::source(outcome_payload_column.as_str()));
    }
    let mut table = Table::new(predictions.name(), columns);

    let mut matched_outcomes = vec![false; outcomes.height()];
    let mut unmatched_predictions = 0usize;
    for row in predictions.rows() {
        let Some(matches) = index.get(&join_key(row.get(left_key))) else {
            unmatched_predictions += 1;
            continue;
        };
        for &right_idx in matches {
            matched_outcomes[right_idx] = true;
            let payload = outcomes.value(right_idx, right_payload).clone();
            let mut cells = row.cells.clone();
            match payload_slot {
                Some(slot) => cells[slot] = payload,
                None => cells.push(payload),
            }
            table.push_row(cells);
        }
    }
    let unmatched_outcomes = matched_outcomes.iter().filter(|m| !**m).count();

    debug!(
        joined_rows = table.height(),
        unmatched_predictions, unmatched_outcomes, "joined predictions with outcomes"
    );

    Ok(JoinedTable {
        table,
        outcome_payload_column,
        unmatched_predictions,
        unmatched_outcomes,
    })
}

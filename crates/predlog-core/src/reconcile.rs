//! Prediction/outcome reconciliation.
//!
//! Produces one analyzable table from a prediction export and an outcome
//! export:
//!
//! 1. inner join on the identifier
//! 2. flatten the `features` object into one column per key
//! 3. extract score and labels from the payloads
//! 4. drop rows without a usable outcome
//! 5. normalize the timestamp to epoch seconds
//! 6. drop rows without an identifier and coerce identifiers to text
//! 7. reindex rows densely from zero
//!
//! Row-level problems never abort a run; they are counted in
//! [`ReconcileDiagnostics`]. Missing columns are fatal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use predlog_ingest::{Record, parse_cell};
use predlog_model::{
    BINARIZED_OUTCOME_COLUMN, BINARIZED_PREDICTION_COLUMN, ColumnLayout, ColumnOrigin,
    FieldValue, PREDICTION_VALUE_COLUMN, Result, Table,
};

use crate::join::inner_join;
use crate::timestamp::normalize_timestamp;

/// Counters describing what reconciliation kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileDiagnostics {
    pub prediction_rows: usize,
    pub outcome_rows: usize,
    pub joined_rows: usize,
    pub unmatched_predictions: usize,
    pub unmatched_outcomes: usize,
    /// Distinct keys found across all `features` cells.
    pub feature_keys: usize,
    /// Flattened keys that overwrote an existing column.
    pub feature_collisions: usize,
    /// Rows whose `features` cell was present but not a JSON object.
    pub malformed_features: usize,
    pub null_outcomes: usize,
    pub invalid_timestamps: usize,
    pub null_identifiers: usize,
    pub output_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub table: Table,
    pub diagnostics: ReconcileDiagnostics,
}

/// Joins, flattens and filters a prediction table and an outcome table.
pub fn reconcile(
    predictions: &Table,
    outcomes: &Table,
    layout: &ColumnLayout,
) -> Result<Reconciliation> {
    let span = info_span!(
        "reconcile",
        predictions = predictions.height(),
        outcomes = outcomes.height()
    );
    let _guard = span.enter();

    // Fail on structural problems before touching any rows.
    predictions.require_column(&layout.record_id)?;
    predictions.require_column(&layout.timestamp)?;
    predictions.require_column(&layout.features)?;
    predictions.require_column(&layout.prediction_payload)?;
    outcomes.require_column(&layout.record_id)?;
    outcomes.require_column(&layout.outcome_payload)?;

    let mut diagnostics = ReconcileDiagnostics {
        prediction_rows: predictions.height(),
        outcome_rows: outcomes.height(),
        ..ReconcileDiagnostics::default()
    };

    let joined = inner_join(
        predictions,
        outcomes,
        &layout.record_id,
        &layout.outcome_payload,
    )?;
    diagnostics.joined_rows = joined.table.height();
    diagnostics.unmatched_predictions = joined.unmatched_predictions;
    diagnostics.unmatched_outcomes = joined.unmatched_outcomes;
    let mut table = joined.table;

    flatten_features(&mut table, layout, &mut diagnostics)?;
    extract_labels(&mut table, layout, &joined.outcome_payload_column)?;

    let outcome_idx = table.require_column(BINARIZED_OUTCOME_COLUMN)?;
    diagnostics.null_outcomes = table.retain_rows(|row| !row.get(outcome_idx).is_null());

    diagnostics.invalid_timestamps = normalize_timestamps(&mut table, &layout.timestamp)?;

    let id_idx = table.require_column(&layout.record_id)?;
    diagnostics.null_identifiers = table.retain_rows(|row| !row.get(id_idx).is_null());
    table.map_column(id_idx, |value| {
        FieldValue::Text(value.to_display_string())
    });

    table.reindex();
    diagnostics.output_rows = table.height();

    info!(
        joined_rows = diagnostics.joined_rows,
        unmatched_predictions = diagnostics.unmatched_predictions,
        unmatched_outcomes = diagnostics.unmatched_outcomes,
        null_outcomes = diagnostics.null_outcomes,
        null_identifiers = diagnostics.null_identifiers,
        output_rows = diagnostics.output_rows,
        "reconciliation complete"
    );

    Ok(Reconciliation { table, diagnostics })
}

/// Two passes over the `features` column: collect the key universe first,
/// then write one column per key so every row carries the same column set.
fn flatten_features(
    table: &mut Table,
    layout: &ColumnLayout,
    diagnostics: &mut ReconcileDiagnostics,
) -> Result<()> {
    let features_idx = table.require_column(&layout.features)?;

    let mut records: Vec<Record> = Vec::with_capacity(table.height());
    let mut keys: BTreeSet<String> = BTreeSet::new();
    for row in table.rows() {
        let cell = row.get(features_idx);
        let record = parse_cell(cell).unwrap_or_else(|| {
            if !cell.is_null() {
                diagnostics.malformed_features += 1;
            }
            Record::new()
        });
        keys.extend(record.keys().cloned());
        records.push(record);
    }
    diagnostics.feature_keys = keys.len();

    for key in &keys {
        let values: Vec<FieldValue> = records
            .iter_mut()
            .map(|record| record.remove(key).unwrap_or_default())
            .collect();
        if table.set_column(key, ColumnOrigin::Feature, values) {
            diagnostics.feature_collisions += 1;
            debug!(column = %key, "flattened feature overwrote an existing column");
        }
    }

    if diagnostics.malformed_features > 0 {
        warn!(
            rows = diagnostics.malformed_features,
            "features cells could not be decoded and were treated as empty"
        );
    }
    if diagnostics.feature_collisions > 0 {
        warn!(
            collisions = diagnostics.feature_collisions,
            "flattened feature keys collided with existing columns"
        );
    }
    Ok(())
}

/// Writes the score and label columns. The outcome payload's label wins over
/// the prediction payload's whenever the outcome payload carries the key,
/// even when its value is null.
fn extract_labels(table: &mut Table, layout: &ColumnLayout, outcome_payload: &str) -> Result<()> {
    let prediction_idx = table.require_column(&layout.prediction_payload)?;
    let outcome_idx = table.require_column(outcome_payload)?;
    let keys = &layout.payload_keys;

    let height = table.height();
    let mut scores = Vec::with_capacity(height);
    let mut predicted = Vec::with_capacity(height);
    let mut actual = Vec::with_capacity(height);
    for row in table.rows() {
        let mut prediction = parse_cell(row.get(prediction_idx)).unwrap_or_default();
        let mut outcome = parse_cell(row.get(outcome_idx)).unwrap_or_default();
        scores.push(prediction.remove(&keys.prediction_value).unwrap_or_default());
        predicted.push(prediction.remove(&keys.binarized_prediction).unwrap_or_default());
        let label = match outcome.remove(&keys.binarized_outcome) {
            Some(value) => value,
            None => prediction.remove(&keys.binarized_outcome).unwrap_or_default(),
        };
        actual.push(label);
    }

    table.set_column(PREDICTION_VALUE_COLUMN, ColumnOrigin::Derived, scores);
    table.set_column(BINARIZED_PREDICTION_COLUMN, ColumnOrigin::Derived, predicted);
    table.set_column(BINARIZED_OUTCOME_COLUMN, ColumnOrigin::Derived, actual);
    Ok(())
}

/// Rewrites the timestamp column as epoch seconds and returns how many cells
/// could not be parsed (those become null).
fn normalize_timestamps(table: &mut Table, column: &str) -> Result<usize> {
    let idx = table.require_column(column)?;
    let mut invalid = 0usize;
    table.map_column(idx, |value| {
        normalize_timestamp(value).unwrap_or_else(|| {
            invalid += 1;
            FieldValue::Null
        })
    });
    if invalid > 0 {
        warn!(column, invalid, "unparseable timestamps were set to null");
    }
    Ok(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions() -> Table {
        let mut table = Table::from_headers(
            "predictions",
            ["record_id", "timestamp", "features", "payload"],
        );
        for (id, features) in [
            ("p1", r#"{"a": 1, "b": null}"#),
            ("p2", r#"{"a": 2, "c": "x"}"#),
            ("p3", r#"{"a": 3}"#),
        ] {
            table.push_row(vec![
                id.into(),
                "2024-01-15 10:00:00.750".into(),
                features.into(),
                r#"{"predictionValue": 0.8, "binarizedPrediction": 1}"#.into(),
            ]);
        }
        table
    }

    fn outcomes() -> Table {
        let mut table = Table::from_headers("outcomes", ["record_id", "payload"]);
        table.push_row(vec!["p1".into(), r#"{"binarizedOutcome": 1}"#.into()]);
        table.push_row(vec!["p2".into(), r#"{"binarizedOutcome": null}"#.into()]);
        table
    }

    #[test]
    fn only_matched_rows_with_outcomes_survive() {
        let result = reconcile(&predictions(), &outcomes(), &ColumnLayout::default()).unwrap();
        let table = &result.table;
        assert_eq!(table.height(), 1);
        assert_eq!(table.value(0, 0).as_str(), Some("p1"));

        let d = &result.diagnostics;
        assert_eq!(d.joined_rows, 2);
        assert_eq!(d.unmatched_predictions, 1);
        assert_eq!(d.null_outcomes, 1);
        assert_eq!(d.output_rows, 1);
    }

    #[test]
    fn features_are_flattened_with_a_fixed_key_set() {
        let result = reconcile(&predictions(), &outcomes(), &ColumnLayout::default()).unwrap();
        let table = &result.table;
        assert_eq!(table.feature_columns(), vec!["a", "b", "c"]);
        let b = table.column_index("b").unwrap();
        let c = table.column_index("c").unwrap();
        assert!(table.value(0, b).is_null());
        assert!(table.value(0, c).is_null());
        assert_eq!(result.diagnostics.feature_keys, 3);
    }

    #[test]
    fn labels_and_timestamp_are_derived() {
        let result = reconcile(&predictions(), &outcomes(), &ColumnLayout::default()).unwrap();
        let table = &result.table;
        let score = table.column_index(PREDICTION_VALUE_COLUMN).unwrap();
        let predicted = table.column_index(BINARIZED_PREDICTION_COLUMN).unwrap();
        let actual = table.column_index(BINARIZED_OUTCOME_COLUMN).unwrap();
        let ts = table.column_index("timestamp").unwrap();
        assert_eq!(table.value(0, score), &FieldValue::Number(0.8));
        assert_eq!(table.value(0, predicted), &FieldValue::Number(1.0));
        assert_eq!(table.value(0, actual), &FieldValue::Number(1.0));
        assert_eq!(table.value(0, ts), &FieldValue::Number(1_705_312_800.0));
    }

    #[test]
    fn prediction_payload_outcome_used_when_outcome_payload_lacks_key() {
        let mut preds = predictions();
        let payload = preds.column_index("payload").unwrap();
        preds.map_column(payload, |_| {
            FieldValue::from(r#"{"predictionValue": 0.2, "binarizedOutcome": 0}"#)
        });
        let mut outs = Table::from_headers("outcomes", ["record_id", "payload"]);
        outs.push_row(vec!["p3".into(), "{}".into()]);
        let result = reconcile(&preds, &outs, &ColumnLayout::default()).unwrap();
        assert_eq!(result.table.height(), 1);
        let actual = result.table.column_index(BINARIZED_OUTCOME_COLUMN).unwrap();
        assert_eq!(result.table.value(0, actual), &FieldValue::Number(0.0));
    }

    #[test]
    fn collisions_are_counted_and_last_write_wins() {
        let mut preds = predictions();
        let features = preds.column_index("features").unwrap();
        preds.map_column(features, |_| FieldValue::from(r#"{"timestamp": "x", "a": 1}"#));
        let result = reconcile(&preds, &outcomes(), &ColumnLayout::default()).unwrap();
        assert_eq!(result.diagnostics.feature_collisions, 1);
        // the overwritten timestamp no longer parses
        assert_eq!(result.diagnostics.invalid_timestamps, 1);
    }

    #[test]
    fn null_identifiers_are_dropped_after_join() {
        let mut preds = predictions();
        preds.push_row(vec![
            FieldValue::Null,
            "2024-01-15".into(),
            "{}".into(),
            r#"{"binarizedOutcome": 1}"#.into(),
        ]);
        let mut outs = outcomes();
        outs.push_row(vec![FieldValue::Null, r#"{"binarizedOutcome": 0}"#.into()]);
        let result = reconcile(&preds, &outs, &ColumnLayout::default()).unwrap();
        assert_eq!(result.diagnostics.null_identifiers, 1);
        assert_eq!(result.table.height(), 1);
    }

    #[test]
    fn malformed_features_do_not_abort() {
        let mut preds = predictions();
        let features = preds.column_index("features").unwrap();
        preds.map_column(features, |_| FieldValue::from("{broken"));
        let result = reconcile(&preds, &outcomes(), &ColumnLayout::default()).unwrap();
        assert_eq!(result.table.height(), 1);
        assert_eq!(result.diagnostics.malformed_features, 2);
        assert!(result.table.feature_columns().is_empty());
    }

    #[test]
    fn missing_features_column_is_fatal() {
        let mut preds = predictions();
        preds.drop_column("features");
        let err = reconcile(&preds, &outcomes(), &ColumnLayout::default()).unwrap_err();
        assert_eq!(err.missing_column(), Some("features"));
    }
}

//! Schema descriptor derivation.

use std::collections::BTreeSet;

use tracing::debug;

use predlog_model::{
    BINARIZED_OUTCOME_COLUMN, BINARIZED_PREDICTION_COLUMN, ColumnLayout, PREDICTION_VALUE_COLUMN,
    Result, SchemaDescriptor, Table,
};

/// Column roles bound in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaBindings {
    pub id: String,
    pub timestamp: Option<String>,
    pub label: String,
    pub score: Option<String>,
    pub actual: String,
}

impl SchemaBindings {
    /// Bindings for a table produced by the reconciler under `layout`.
    pub fn from_layout(layout: &ColumnLayout) -> Self {
        Self {
            id: layout.record_id.clone(),
            timestamp: Some(layout.timestamp.clone()),
            label: BINARIZED_PREDICTION_COLUMN.to_string(),
            score: Some(PREDICTION_VALUE_COLUMN.to_string()),
            actual: BINARIZED_OUTCOME_COLUMN.to_string(),
        }
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        [Some(&self.id), self.timestamp.as_ref(), Some(&self.label)]
            .into_iter()
            .chain([self.score.as_ref(), Some(&self.actual)])
            .flatten()
            .map(String::as_str)
    }
}

/// Derives the descriptor for `table`.
///
/// The feature set is the table's flattened feature columns minus `excluded`
/// and minus every bound column. Call this at emission time; the result is
/// only valid for the column set it was built from.
pub fn build_schema(
    table: &Table,
    bindings: &SchemaBindings,
    excluded: &[String],
) -> Result<SchemaDescriptor> {
    for column in bindings.columns() {
        table.require_column(column)?;
    }

    let bound: BTreeSet<&str> = bindings.columns().collect();
    let feature_column_names: BTreeSet<String> = table
        .feature_columns()
        .into_iter()
        .filter(|name| !bound.contains(name))
        .filter(|name| !excluded.iter().any(|ex| ex == name))
        .map(str::to_string)
        .collect();

    debug!(
        features = feature_column_names.len(),
        excluded = excluded.len(),
        "derived schema descriptor"
    );

    Ok(SchemaDescriptor {
        prediction_id_column_name: bindings.id.clone(),
        timestamp_column_name: bindings.timestamp.clone(),
        prediction_label_column_name: bindings.label.clone(),
        prediction_score_column_name: bindings.score.clone(),
        actual_label_column_name: bindings.actual.clone(),
        feature_column_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use predlog_model::{ColumnOrigin, FieldValue};

    fn reconciled() -> Table {
        let mut table = Table::from_headers(
            "reconciled",
            [
                "record_id",
                "timestamp",
                PREDICTION_VALUE_COLUMN,
                BINARIZED_PREDICTION_COLUMN,
                BINARIZED_OUTCOME_COLUMN,
            ],
        );
        table.push_row(vec!["p1".into()]);
        for name in ["amount", "device", "median_pct_eaten"] {
            table.set_column(name, ColumnOrigin::Feature, vec![FieldValue::Null]);
        }
        table
    }

    #[test]
    fn excludes_listed_metadata() {
        let layout = ColumnLayout::default();
        let schema = build_schema(
            &reconciled(),
            &SchemaBindings::from_layout(&layout),
            &["median_pct_eaten".to_string()],
        )
        .unwrap();
        assert_eq!(
            schema.feature_column_names.iter().collect::<Vec<_>>(),
            vec!["amount", "device"]
        );
        assert_eq!(
            schema.prediction_score_column_name.as_deref(),
            Some(PREDICTION_VALUE_COLUMN)
        );
    }

    #[test]
    fn feature_named_like_a_bound_column_is_not_a_feature() {
        let mut table = reconciled();
        table.set_column("timestamp", ColumnOrigin::Feature, vec![FieldValue::Null]);
        let schema = build_schema(
            &table,
            &SchemaBindings::from_layout(&ColumnLayout::default()),
            &[],
        )
        .unwrap();
        assert!(!schema.feature_column_names.contains("timestamp"));
        assert_eq!(schema.feature_count(), 3);
    }

    #[test]
    fn missing_bound_column_is_schema_mismatch() {
        let mut table = reconciled();
        table.drop_column(BINARIZED_OUTCOME_COLUMN);
        let err = build_schema(
            &table,
            &SchemaBindings::from_layout(&ColumnLayout::default()),
            &[],
        )
        .unwrap_err();
        assert_eq!(err.missing_column(), Some(BINARIZED_OUTCOME_COLUMN));
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Binds the semantic roles of a reconciled table's columns for a downstream
/// consumer.
///
/// The feature set is derived from the table it accompanies; build it with
/// the schema builder rather than by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub prediction_id_column_name: String,
    pub timestamp_column_name: Option<String>,
    pub prediction_label_column_name: String,
    pub prediction_score_column_name: Option<String>,
    pub actual_label_column_name: String,
    pub feature_column_names: BTreeSet<String>,
}

impl SchemaDescriptor {
    /// All columns bound to a non-feature role.
    pub fn bound_columns(&self) -> Vec<&str> {
        let mut bound = vec![
            self.prediction_id_column_name.as_str(),
            self.prediction_label_column_name.as_str(),
            self.actual_label_column_name.as_str(),
        ];
        bound.extend(self.timestamp_column_name.as_deref());
        bound.extend(self.prediction_score_column_name.as_deref());
        bound
    }

    pub fn feature_count(&self) -> usize {
        self.feature_column_names.len()
    }
}

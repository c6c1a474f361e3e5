//! Input column names and payload keys.
//!
//! Defaults match the canonical prediction/outcome export layout; every name
//! can be overridden from the `[columns]` section of the configuration file.

use serde::{Deserialize, Serialize};

/// Column written with the score extracted from the prediction payload.
pub const PREDICTION_VALUE_COLUMN: &str = "prediction_value";
/// Column written with the binarized prediction label.
pub const BINARIZED_PREDICTION_COLUMN: &str = "binarized_prediction";
/// Column written with the binarized ground-truth label.
pub const BINARIZED_OUTCOME_COLUMN: &str = "binarized_outcome";

/// Suffix applied to the outcome payload column when its name collides
/// with a prediction column during the join.
pub const OUTCOME_SUFFIX: &str = "_actual";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadKeys {
    pub prediction_value: String,
    pub binarized_prediction: String,
    pub binarized_outcome: String,
}

impl Default for PayloadKeys {
    fn default() -> Self {
        Self {
            prediction_value: "predictionValue".to_string(),
            binarized_prediction: "binarizedPrediction".to_string(),
            binarized_outcome: "binarizedOutcome".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    /// Identifier shared by both tables.
    pub record_id: String,
    /// Prediction timestamp.
    pub timestamp: String,
    /// JSON object text holding model inputs (prediction table).
    pub features: String,
    /// JSON object text holding the prediction payload.
    pub prediction_payload: String,
    /// JSON object text holding the outcome payload.
    pub outcome_payload: String,
    /// Boolean flag column (prediction table).
    pub missing_required: String,
    pub payload_keys: PayloadKeys,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            record_id: "record_id".to_string(),
            timestamp: "timestamp".to_string(),
            features: "features".to_string(),
            prediction_payload: "payload".to_string(),
            outcome_payload: "payload".to_string(),
            missing_required: "is_missing_required_data".to_string(),
            payload_keys: PayloadKeys::default(),
        }
    }
}

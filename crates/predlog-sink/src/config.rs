//! Sink configuration.
//!
//! Built once by the caller and passed by reference to every sink call.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    ScoreCategorical,
    BinaryClassification,
    Regression,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScoreCategorical => "score_categorical",
            Self::BinaryClassification => "binary_classification",
            Self::Regression => "regression",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Production,
    Validation,
    Training,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Validation => "validation",
            Self::Training => "training",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub model_id: String,
    pub model_version: String,
    pub model_type: ModelType,
    pub environment: Environment,
    /// Root directory used by the directory sink.
    pub output_dir: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            model_id: "model".to_string(),
            model_version: "1.0".to_string(),
            model_type: ModelType::default(),
            environment: Environment::default(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl SinkConfig {
    /// File stem shared by every artifact of one delivery.
    pub fn artifact_stem(&self) -> String {
        format!(
            "{}-{}-{}",
            self.model_id, self.model_version, self.environment
        )
    }
}

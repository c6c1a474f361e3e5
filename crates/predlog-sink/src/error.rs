//! Error types for sink delivery.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The request does not satisfy the sink's contract.
    #[error("rejected: {reason}")]
    Rejected { reason: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    #[error("failed to encode manifest: {0}")]
    Json(#[from] serde_json::Error),
}

impl SinkError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// HTTP-style status reported for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected { .. } => 400,
            Self::Write { .. } | Self::DataFrame { .. } | Self::Json(_) => 500,
        }
    }
}

impl From<polars::prelude::PolarsError> for SinkError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SinkError>;

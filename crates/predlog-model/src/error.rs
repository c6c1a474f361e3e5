use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// An expected column is absent from an input table.
    #[error("schema mismatch: table `{table}` has no column `{column}`")]
    SchemaMismatch { table: String, column: String },
}

impl ModelError {
    pub fn schema_mismatch(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Name of the missing column when this is a schema mismatch.
    pub fn missing_column(&self) -> Option<&str> {
        match self {
            Self::SchemaMismatch { column, .. } => Some(column),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

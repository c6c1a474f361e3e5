//! The sink contract and the directory-backed sink.
//!
//! A sink accepts a reconciled table, its schema descriptor and the model
//! identity from [`SinkConfig`], and answers with a status code and message.
//! A failed delivery is reported through the response; it never touches the
//! caller's table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, SerWriter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use predlog_model::{SchemaDescriptor, Table};

use crate::config::{Environment, ModelType, SinkConfig};
use crate::error::{Result, SinkError};
use crate::frame::table_to_dataframe;

/// Everything handed to a sink in one call.
#[derive(Debug, Clone, Copy)]
pub struct LogRequest<'a> {
    pub table: &'a Table,
    pub schema: &'a SchemaDescriptor,
    pub config: &'a SinkConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkResponse {
    pub status_code: u16,
    pub message: String,
}

impl SinkResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<&SinkError> for SinkResponse {
    fn from(err: &SinkError) -> Self {
        Self {
            status_code: err.status_code(),
            message: err.to_string(),
        }
    }
}

pub trait Sink {
    fn log(&self, request: &LogRequest<'_>) -> SinkResponse;
}

/// Checks the request against its own descriptor before anything is sent.
pub fn validate_request(request: &LogRequest<'_>) -> Result<()> {
    if request.config.model_id.trim().is_empty() {
        return Err(SinkError::rejected("model id is empty"));
    }
    if request.config.model_version.trim().is_empty() {
        return Err(SinkError::rejected("model version is empty"));
    }
    let schema = request.schema;
    for column in schema
        .bound_columns()
        .into_iter()
        .chain(schema.feature_column_names.iter().map(String::as_str))
    {
        if !request.table.has_column(column) {
            return Err(SinkError::rejected(format!(
                "schema column `{column}` is not in the table"
            )));
        }
    }
    Ok(())
}

/// Written next to the table so a consumer can bind its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryManifest {
    pub model_id: String,
    pub model_version: String,
    pub model_type: ModelType,
    pub environment: Environment,
    pub rows: usize,
    pub data_file: String,
    pub schema: SchemaDescriptor,
}

/// Delivers to `<output_dir>/<model>-<version>-<environment>.csv` plus a
/// `.schema.json` manifest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectorySink;

impl DirectorySink {
    pub fn new() -> Self {
        Self
    }

    /// Paths of the data file and manifest for `config`.
    pub fn artifact_paths(config: &SinkConfig) -> (PathBuf, PathBuf) {
        let stem = config.artifact_stem();
        (
            config.output_dir.join(format!("{stem}.csv")),
            config.output_dir.join(format!("{stem}.schema.json")),
        )
    }

    fn deliver(&self, request: &LogRequest<'_>) -> Result<PathBuf> {
        validate_request(request)?;
        let config = request.config;
        let (data_path, manifest_path) = Self::artifact_paths(config);

        fs::create_dir_all(&config.output_dir).map_err(|source| SinkError::Write {
            path: config.output_dir.clone(),
            source,
        })?;

        let mut df = table_to_dataframe(request.table)?;
        let mut file = File::create(&data_path).map_err(|source| SinkError::Write {
            path: data_path.clone(),
            source,
        })?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        let manifest = DeliveryManifest {
            model_id: config.model_id.clone(),
            model_version: config.model_version.clone(),
            model_type: config.model_type,
            environment: config.environment,
            rows: request.table.height(),
            data_file: file_name(&data_path),
            schema: request.schema.clone(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&manifest_path, json).map_err(|source| SinkError::Write {
            path: manifest_path.clone(),
            source,
        })?;
        Ok(data_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Sink for DirectorySink {
    fn log(&self, request: &LogRequest<'_>) -> SinkResponse {
        match self.deliver(request) {
            Ok(path) => {
                info!(
                    path = %path.display(),
                    rows = request.table.height(),
                    model_id = %request.config.model_id,
                    "delivered reconciled table"
                );
                SinkResponse::ok(format!(
                    "logged {} rows for model {} to {}",
                    request.table.height(),
                    request.config.model_id,
                    path.display()
                ))
            }
            Err(err) => {
                warn!(error = %err, "sink delivery failed");
                SinkResponse::from(&err)
            }
        }
    }
}

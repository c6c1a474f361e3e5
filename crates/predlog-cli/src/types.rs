use std::path::PathBuf;

use serde::Serialize;

use predlog_core::{AlignmentReport, QualityReport, ReconcileDiagnostics};
use predlog_model::SchemaDescriptor;
use predlog_sink::SinkResponse;

/// Result of a `reconcile` run.
#[derive(Debug, Serialize)]
pub struct ReconcileOutcome {
    /// Local copy of the reconciled table.
    pub output_path: PathBuf,
    pub diagnostics: ReconcileDiagnostics,
    pub schema: SchemaDescriptor,
    pub quality: Option<QualityReport>,
    /// `None` when the sink was skipped.
    pub sink: Option<SinkResponse>,
}

impl ReconcileOutcome {
    pub fn sink_failed(&self) -> bool {
        self.sink.as_ref().is_some_and(|response| !response.is_success())
    }
}

#[derive(Debug)]
pub struct AlignOutcome {
    pub output_path: PathBuf,
    pub report: AlignmentReport,
}

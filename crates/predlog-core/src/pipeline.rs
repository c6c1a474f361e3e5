//! End-to-end run: reconcile, audit, derive the schema.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use predlog_model::{ColumnLayout, Result, SchemaDescriptor, Table};

use crate::audit::{QualityReport, audit_table};
use crate::reconcile::{Reconciliation, reconcile};
use crate::schema_builder::{SchemaBindings, build_schema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub layout: ColumnLayout,
    /// Flattened feature names kept out of the descriptor.
    pub excluded_features: Vec<String>,
    /// Run the quality audit on the prediction table first.
    pub audit: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub reconciliation: Reconciliation,
    pub schema: SchemaDescriptor,
    pub quality: Option<QualityReport>,
}

/// Runs every stage against in-memory tables. Nothing is written.
pub fn run_pipeline(
    predictions: &Table,
    outcomes: &Table,
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    let span = info_span!("pipeline");
    let _guard = span.enter();

    let quality = if options.audit {
        Some(audit_table(predictions, &options.layout)?)
    } else {
        None
    };

    let reconciliation = reconcile(predictions, outcomes, &options.layout)?;
    let schema = build_schema(
        &reconciliation.table,
        &SchemaBindings::from_layout(&options.layout),
        &options.excluded_features,
    )?;

    info!(
        rows = reconciliation.table.height(),
        features = schema.feature_count(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        reconciliation,
        schema,
        quality,
    })
}

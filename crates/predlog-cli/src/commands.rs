use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use predlog_core::{
    AnalyticsOptions, AnalyticsSummary, PipelineOptions, QualityReport, align_outcome_ids,
    audit_table, describe, run_pipeline,
};
use predlog_ingest::{read_csv_table, write_csv_table};
use predlog_model::Table;
use predlog_sink::{DirectorySink, LogRequest, Sink, SinkConfig};

use crate::cli::{AlignArgs, AuditArgs, DescribeArgs, ReconcileArgs};
use crate::config::Config;
use crate::types::{AlignOutcome, ReconcileOutcome};

fn load(path: &Path) -> Result<Table> {
    read_csv_table(path).with_context(|| format!("load {}", path.display()))
}

/// Applies command-line overrides on top of the `[sink]` section.
fn sink_config(args: &ReconcileArgs, base: &SinkConfig) -> SinkConfig {
    let mut config = base.clone();
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(id) = &args.model_id {
        config.model_id.clone_from(id);
    }
    if let Some(version) = &args.model_version {
        config.model_version.clone_from(version);
    }
    if let Some(model_type) = args.model_type {
        config.model_type = model_type.into();
    }
    if let Some(environment) = args.environment {
        config.environment = environment.into();
    }
    config
}

pub fn run_reconcile(args: &ReconcileArgs, config: &Config) -> Result<ReconcileOutcome> {
    let span = info_span!("reconcile_command");
    let _guard = span.enter();
    let start = Instant::now();

    let predictions = load(&args.predictions)?;
    let outcomes = load(&args.outcomes)?;

    let mut excluded = config.schema.exclude.clone();
    excluded.extend(args.exclude.iter().cloned());
    let options = PipelineOptions {
        layout: config.columns.clone(),
        excluded_features: excluded,
        audit: args.audit,
    };
    let output = run_pipeline(&predictions, &outcomes, &options).context("reconcile tables")?;

    let sink_config = sink_config(args, &config.sink);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| sink_config.output_dir.join("reconciled.csv"));
    write_csv_table(&output.reconciliation.table, &output_path)
        .with_context(|| format!("write {}", output_path.display()))?;

    let sink = if args.no_sink {
        None
    } else {
        Some(DirectorySink::new().log(&LogRequest {
            table: &output.reconciliation.table,
            schema: &output.schema,
            config: &sink_config,
        }))
    };

    info!(
        output = %output_path.display(),
        rows = output.reconciliation.table.height(),
        duration_ms = start.elapsed().as_millis(),
        "reconcile command complete"
    );

    Ok(ReconcileOutcome {
        output_path,
        diagnostics: output.reconciliation.diagnostics,
        schema: output.schema,
        quality: output.quality,
        sink,
    })
}

pub fn run_audit(args: &AuditArgs, config: &Config) -> Result<QualityReport> {
    let table = load(&args.predictions)?;
    audit_table(&table, &config.columns).context("audit predictions")
}

pub fn run_describe(args: &DescribeArgs, config: &Config) -> Result<AnalyticsSummary> {
    let table = load(&args.input)?;
    let options = AnalyticsOptions {
        score_column: args.score_column.clone(),
        label_column: args.label_column.clone(),
        timestamp_column: args.timestamp_column.clone(),
        feature_columns: args.features.clone(),
        skip_columns: Vec::new(),
        max_categories: args.max_categories,
    }
    .skipping_layout(&config.columns);
    describe(&table, &options).context("describe table")
}

pub fn run_align(args: &AlignArgs, config: &Config) -> Result<AlignOutcome> {
    let predictions = load(&args.predictions)?;
    let outcomes = load(&args.outcomes)?;
    let id_column = args
        .id_column
        .as_deref()
        .unwrap_or(config.columns.record_id.as_str());
    let (aligned, report) =
        align_outcome_ids(&predictions, &outcomes, id_column).context("align outcome ids")?;
    write_csv_table(&aligned, &args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    Ok(AlignOutcome {
        output_path: args.output.clone(),
        report,
    })
}

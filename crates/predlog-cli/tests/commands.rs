//! Integration tests for the command handlers.

use std::fs;
use std::path::Path;

use clap::Parser;

use predlog_cli::cli::{Cli, Command};
use predlog_cli::commands::{run_align, run_audit, run_describe, run_reconcile};
use predlog_cli::config::Config;
use predlog_ingest::read_csv_table;

const PREDICTIONS: &str = "\
record_id,timestamp,features,payload,is_missing_required_data
p1,2024-01-15 10:00:00,\"{\"\"amount\"\": 12.5, \"\"device\"\": \"\"mobile\"\", \"\"median_pct_eaten\"\": 0.4}\",\"{\"\"predictionValue\"\": 0.8, \"\"binarizedPrediction\"\": 1}\",False
p2,2024-01-15 11:00:00,\"{\"\"amount\"\": 3}\",\"{\"\"predictionValue\"\": 0.1, \"\"binarizedPrediction\"\": 0}\",True
p3,2024-01-15 12:00:00,{broken,\"{\"\"predictionValue\"\": 0.6}\",False
";

const OUTCOMES: &str = "\
record_id,payload
p1,\"{\"\"binarizedOutcome\"\": 1}\"
p2,\"{\"\"binarizedOutcome\"\": null}\"
x9,\"{\"\"binarizedOutcome\"\": 0}\"
";

fn write_inputs(dir: &Path) -> (String, String) {
    let predictions = dir.join("prediction_details.csv");
    let outcomes = dir.join("outcome_details.csv");
    fs::write(&predictions, PREDICTIONS).expect("write predictions");
    fs::write(&outcomes, OUTCOMES).expect("write outcomes");
    (
        predictions.display().to_string(),
        outcomes.display().to_string(),
    )
}

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["predlog"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse arguments").command
}

#[test]
fn reconcile_writes_output_and_delivers() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, outcomes) = write_inputs(dir.path());
    let out_dir = dir.path().join("out").display().to_string();
    let Command::Reconcile(args) = parse(&[
        "reconcile",
        &predictions,
        &outcomes,
        "--output-dir",
        &out_dir,
        "--model-id",
        "fraud",
        "--exclude",
        "median_pct_eaten",
        "--audit",
    ]) else {
        panic!("expected reconcile command");
    };

    let outcome = run_reconcile(&args, &Config::default()).expect("reconcile");
    assert_eq!(outcome.diagnostics.output_rows, 1);
    assert_eq!(outcome.diagnostics.unmatched_predictions, 1);
    assert_eq!(outcome.diagnostics.unmatched_outcomes, 1);
    assert_eq!(outcome.diagnostics.null_outcomes, 1);
    assert!(!outcome.sink_failed());
    assert_eq!(
        outcome.schema.feature_column_names.iter().collect::<Vec<_>>(),
        vec!["amount", "device"]
    );
    assert!(outcome.quality.is_some());

    let reconciled = read_csv_table(&outcome.output_path).expect("read reconciled");
    assert_eq!(reconciled.height(), 1);
    assert!(
        dir.path()
            .join("out/fraud-1.0-production.schema.json")
            .exists()
    );
}

#[test]
fn sink_failure_keeps_local_output() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, outcomes) = write_inputs(dir.path());
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, "not a directory").expect("write blocker");
    let local = dir.path().join("local/reconciled.csv");
    let Command::Reconcile(args) = parse(&[
        "reconcile",
        &predictions,
        &outcomes,
        "--output-dir",
        &blocker.display().to_string(),
        "--output",
        &local.display().to_string(),
    ]) else {
        panic!("expected reconcile command");
    };

    let outcome = run_reconcile(&args, &Config::default()).expect("reconcile");
    assert!(outcome.sink_failed());
    assert!(local.exists());
}

#[test]
fn reconcile_reports_missing_column() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (_, outcomes) = write_inputs(dir.path());
    let predictions = dir.path().join("bare.csv");
    fs::write(&predictions, "record_id,timestamp,payload\np1,2024-01-15,{}\n")
        .expect("write predictions");
    let Command::Reconcile(args) = parse(&[
        "reconcile",
        &predictions.display().to_string(),
        &outcomes,
        "--no-sink",
    ]) else {
        panic!("expected reconcile command");
    };

    let err = run_reconcile(&args, &Config::default()).unwrap_err();
    assert!(format!("{err:#}").contains("`features`"));
}

#[test]
fn audit_reads_prediction_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, _) = write_inputs(dir.path());
    let Command::Audit(args) = parse(&["audit", &predictions, "--json"]) else {
        panic!("expected audit command");
    };
    assert!(args.json);

    let report = run_audit(&args, &Config::default()).expect("audit");
    assert_eq!(report.rows, 3);
    assert!((report.missing_required_rate - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(report.null_outcomes.null_count, 3);
    assert_eq!(report.feature_null_rates.len(), 3);
}

#[test]
fn describe_summarizes_scored_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let input = dir.path().join("synthetic_data.csv");
    fs::write(
        &input,
        "prediction_id,prediction_timestamp,prediction_score,actual_label,device_type\n\
         a,2024-01-02,0.9,1,mobile\n\
         b,2024-01-01,0.2,0,desktop\n",
    )
    .expect("write input");
    let Command::Describe(args) = parse(&[
        "describe",
        &input.display().to_string(),
        "--score-column",
        "prediction_score",
        "--label-column",
        "actual_label",
        "--timestamp-column",
        "prediction_timestamp",
        "--feature",
        "device_type",
    ]) else {
        panic!("expected describe command");
    };

    let summary = run_describe(&args, &Config::default()).expect("describe");
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.accuracy, Some(1.0));
    assert_eq!(summary.features.len(), 1);
    assert_eq!(
        summary.timestamp_range.map(|r| r.min),
        Some("2024-01-01".to_string())
    );
}

#[test]
fn describe_on_reconciled_output_summarizes_flattened_features() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, outcomes) = write_inputs(dir.path());
    let local = dir.path().join("reconciled.csv").display().to_string();
    let Command::Reconcile(args) = parse(&[
        "reconcile",
        &predictions,
        &outcomes,
        "--output",
        &local,
        "--no-sink",
    ]) else {
        panic!("expected reconcile command");
    };
    run_reconcile(&args, &Config::default()).expect("reconcile");

    let Command::Describe(args) = parse(&["describe", &local]) else {
        panic!("expected describe command");
    };
    let summary = run_describe(&args, &Config::default()).expect("describe");
    let names: Vec<&str> = summary.features.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["amount", "device", "median_pct_eaten"]);
    assert_eq!(summary.accuracy, Some(1.0));
}

#[test]
fn reconcile_outcome_serializes_for_json_output() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, outcomes) = write_inputs(dir.path());
    let local = dir.path().join("reconciled.csv").display().to_string();
    let Command::Reconcile(args) = parse(&[
        "reconcile",
        &predictions,
        &outcomes,
        "--output",
        &local,
        "--no-sink",
        "--json",
    ]) else {
        panic!("expected reconcile command");
    };
    assert!(args.json);

    let outcome = run_reconcile(&args, &Config::default()).expect("reconcile");
    let json = serde_json::to_value(&outcome).expect("serialize outcome");
    assert_eq!(json["diagnostics"]["output_rows"], 1);
    assert_eq!(json["schema"]["prediction_id_column_name"], "record_id");
    assert!(json["sink"].is_null());
}

#[test]
fn align_rewrites_outcome_ids() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (predictions, outcomes) = write_inputs(dir.path());
    let output = dir.path().join("outcome_details_modified.csv");
    let Command::Align(args) = parse(&[
        "align",
        &predictions,
        &outcomes,
        "--output",
        &output.display().to_string(),
    ]) else {
        panic!("expected align command");
    };

    let outcome = run_align(&args, &Config::default()).expect("align");
    assert_eq!(outcome.report.aligned_rows, 3);
    let aligned = read_csv_table(&output).expect("read aligned");
    let ids: Vec<String> = aligned
        .column_values(0)
        .map(|value| value.to_display_string())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
}

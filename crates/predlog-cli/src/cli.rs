//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use predlog_sink::{Environment, ModelType};

#[derive(Parser)]
#[command(
    name = "predlog",
    version,
    about = "Reconcile prediction and outcome exports and audit their quality",
    long_about = "Join a prediction export with an outcome export, flatten the \
                  JSON-encoded features and payloads, drop rows without a usable \
                  outcome or identifier, and hand the clean table plus its schema \
                  descriptor to a sink."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: platform config dir).
    #[arg(long, value_name = "PATH", env = "PREDLOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile predictions with outcomes and deliver the result.
    Reconcile(ReconcileArgs),

    /// Report data quality metrics for a prediction file.
    Audit(AuditArgs),

    /// Print descriptive statistics for a scored CSV file.
    Describe(DescribeArgs),

    /// Rewrite outcome identifiers to match a prediction file.
    Align(AlignArgs),
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Prediction export (CSV).
    #[arg(value_name = "PREDICTIONS")]
    pub predictions: PathBuf,

    /// Outcome export (CSV).
    #[arg(value_name = "OUTCOMES")]
    pub outcomes: PathBuf,

    /// Where to write the reconciled table (default: <OUTPUT_DIR>/reconciled.csv).
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Sink output directory (overrides the config file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "model-id")]
    pub model_id: Option<String>,

    #[arg(long = "model-version")]
    pub model_version: Option<String>,

    #[arg(long = "model-type", value_enum)]
    pub model_type: Option<ModelTypeArg>,

    #[arg(long, value_enum)]
    pub environment: Option<EnvironmentArg>,

    /// Feature name to leave out of the schema (repeatable).
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Also audit the prediction file before reconciling.
    #[arg(long)]
    pub audit: bool,

    /// Write the reconciled table only; skip the sink.
    #[arg(long = "no-sink")]
    pub no_sink: bool,

    /// Print diagnostics, schema and sink response as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AuditArgs {
    /// Prediction export (CSV).
    #[arg(value_name = "PREDICTIONS")]
    pub predictions: PathBuf,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Scored CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(long = "score-column", default_value = "prediction_value")]
    pub score_column: String,

    #[arg(long = "label-column", default_value = "binarized_outcome")]
    pub label_column: String,

    #[arg(long = "timestamp-column")]
    pub timestamp_column: Option<String>,

    /// Feature column to summarize (repeatable; default: all other columns).
    #[arg(long = "feature", value_name = "NAME")]
    pub features: Vec<String>,

    /// Category counts shown per categorical feature.
    #[arg(long = "max-categories", default_value_t = 10)]
    pub max_categories: usize,

    /// Print the summary as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AlignArgs {
    /// Prediction export supplying the identifiers.
    #[arg(value_name = "PREDICTIONS")]
    pub predictions: PathBuf,

    /// Outcome export to rewrite.
    #[arg(value_name = "OUTCOMES")]
    pub outcomes: PathBuf,

    /// Where to write the aligned outcome file.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Identifier column (overrides the config file).
    #[arg(long = "id-column")]
    pub id_column: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModelTypeArg {
    ScoreCategorical,
    BinaryClassification,
    Regression,
}

impl From<ModelTypeArg> for ModelType {
    fn from(arg: ModelTypeArg) -> Self {
        match arg {
            ModelTypeArg::ScoreCategorical => Self::ScoreCategorical,
            ModelTypeArg::BinaryClassification => Self::BinaryClassification,
            ModelTypeArg::Regression => Self::Regression,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnvironmentArg {
    Production,
    Validation,
    Training,
}

impl From<EnvironmentArg> for Environment {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Production => Self::Production,
            EnvironmentArg::Validation => Self::Validation,
            EnvironmentArg::Training => Self::Training,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

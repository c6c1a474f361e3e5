//! Reconciliation, quality audit, schema derivation and descriptive
//! analytics over prediction and outcome tables.

pub mod align;
pub mod analytics;
pub mod audit;
pub mod join;
pub mod pipeline;
pub mod reconcile;
pub mod schema_builder;
pub mod timestamp;

pub use align::{AlignmentReport, align_outcome_ids};
pub use analytics::{
    AnalyticsOptions, AnalyticsSummary, CategoryCount, FeatureSummary, TimestampRange, describe,
};
pub use audit::{
    FeatureNullRate, NullOutcomeRate, QualityReport, audit_table, feature_null_rates,
    missing_required_rate, null_outcome_rate,
};
pub use join::{JoinedTable, inner_join};
pub use pipeline::{PipelineOptions, PipelineOutput, run_pipeline};
pub use reconcile::{ReconcileDiagnostics, Reconciliation, reconcile};
pub use schema_builder::{SchemaBindings, build_schema};
pub use timestamp::{normalize_timestamp, parse_epoch_seconds};

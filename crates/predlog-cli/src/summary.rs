use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use predlog_core::{AnalyticsSummary, FeatureSummary, QualityReport, ReconcileDiagnostics};

use crate::types::{AlignOutcome, ReconcileOutcome};

pub fn print_reconcile(outcome: &ReconcileOutcome) {
    println!("Output: {}", outcome.output_path.display());
    if let Some(report) = &outcome.quality {
        print_quality(report);
    }
    print_diagnostics(&outcome.diagnostics);

    let schema = &outcome.schema;
    println!();
    println!(
        "Schema: id={} timestamp={} label={} score={} actual={}",
        schema.prediction_id_column_name,
        schema.timestamp_column_name.as_deref().unwrap_or("-"),
        schema.prediction_label_column_name,
        schema.prediction_score_column_name.as_deref().unwrap_or("-"),
        schema.actual_label_column_name,
    );
    let features: Vec<&str> = schema
        .feature_column_names
        .iter()
        .map(String::as_str)
        .collect();
    println!("Features ({}): {}", features.len(), features.join(", "));

    match &outcome.sink {
        Some(response) if response.is_success() => {
            println!("Sink: {} {}", response.status_code, response.message);
        }
        Some(response) => {
            eprintln!(
                "Sink failed with status {}: {}",
                response.status_code, response.message
            );
        }
        None => println!("Sink: skipped"),
    }
}

fn print_diagnostics(diagnostics: &ReconcileDiagnostics) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Prediction rows", diagnostics.prediction_rows, None),
        ("Outcome rows", diagnostics.outcome_rows, None),
        ("Joined", diagnostics.joined_rows, None),
        ("Unmatched predictions", diagnostics.unmatched_predictions, Some(Color::Yellow)),
        ("Unmatched outcomes", diagnostics.unmatched_outcomes, Some(Color::Yellow)),
        ("Malformed features", diagnostics.malformed_features, Some(Color::Yellow)),
        ("Feature collisions", diagnostics.feature_collisions, Some(Color::Yellow)),
        ("Null outcomes dropped", diagnostics.null_outcomes, Some(Color::Red)),
        ("Invalid timestamps", diagnostics.invalid_timestamps, Some(Color::Yellow)),
        ("Null identifiers dropped", diagnostics.null_identifiers, Some(Color::Red)),
    ];
    for (label, count, color) in rows {
        table.add_row(vec![Cell::new(label), count_cell(count, color)]);
    }
    table.add_row(vec![
        Cell::new("Output rows")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(diagnostics.output_rows).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("Reconciliation ({} feature keys):", diagnostics.feature_keys);
    println!("{table}");
}

pub fn print_quality(report: &QualityReport) {
    println!("Quality: {} ({} rows)", report.table, report.rows);
    println!(
        "  Missing required data: {}",
        format_percent(report.missing_required_rate)
    );
    println!(
        "  Null outcomes: {} of {} ({})",
        report.null_outcomes.null_count,
        report.null_outcomes.total,
        format_percent(report.null_outcomes.rate)
    );
    if report.feature_null_rates.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Nulls"),
        header_cell("Null rate"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for rate in &report.feature_null_rates {
        table.add_row(vec![
            Cell::new(&rate.feature),
            count_cell(rate.null_count, Some(Color::Yellow)),
            Cell::new(format_percent(rate.rate)),
        ]);
    }
    println!("{table}");
}

pub fn print_analytics(summary: &AnalyticsSummary) {
    println!("Total predictions: {}", summary.total_rows);
    println!("Scored rows: {}", summary.scored_rows);
    println!("Accuracy: {}", optional_percent(summary.accuracy));
    println!("Average prediction score: {}", optional_percent(summary.mean_score));
    println!("Actual positive rate: {}", optional_percent(summary.base_rate));
    if let Some(range) = &summary.timestamp_range {
        println!("Date range: {} to {}", range.min, range.max);
    }
    if summary.features.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Feature"),
        header_cell("Count"),
        header_cell("Summary"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for feature in &summary.features {
        let (count, detail) = match feature {
            FeatureSummary::Numeric {
                count,
                mean,
                min,
                max,
                ..
            } => (*count, format!("mean {mean:.3}, min {min}, max {max}")),
            FeatureSummary::Categorical {
                count,
                distinct,
                top,
                ..
            } => {
                let values: Vec<String> = top
                    .iter()
                    .map(|c| format!("{}: {}", c.value, c.count))
                    .collect();
                (*count, format!("{distinct} distinct; {}", values.join(", ")))
            }
        };
        table.add_row(vec![Cell::new(feature.name()), Cell::new(count), Cell::new(detail)]);
    }
    println!();
    println!("Feature distributions:");
    println!("{table}");
}

pub fn print_alignment(outcome: &AlignOutcome) {
    let report = &outcome.report;
    println!("Output: {}", outcome.output_path.display());
    println!(
        "Aligned {} outcome rows to {} distinct identifiers ({} truncated)",
        report.aligned_rows, report.distinct_ids, report.truncated_rows
    );
}

pub fn format_percent(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

fn optional_percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_string(), format_percent)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Option<Color>) -> Cell {
    match color {
        Some(color) if count > 0 => Cell::new(count).fg(color).add_attribute(Attribute::Bold),
        _ => dim_cell(count),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

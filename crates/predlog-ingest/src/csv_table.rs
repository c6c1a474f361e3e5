use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use predlog_model::{FieldValue, Table};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> FieldValue {
    FieldValue::from_cell(raw.trim_matches('\u{feff}'))
}

/// Reads a headed CSV file fully into memory.
///
/// Blank cells load as null; everything else loads as text. Short records are
/// padded with nulls, fully blank records are skipped.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let file =
        std::fs::File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string();
    read_csv_from(file, &name).with_context(|| format!("parse csv: {}", path.display()))
}

/// Reads CSV data from any reader into a table with the given name.
pub fn read_csv_from<R: Read>(reader: R, name: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("read csv header")?
        .iter()
        .map(normalize_header)
        .collect();
    let mut table = Table::from_headers(name, headers);
    let mut skipped = 0usize;
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", idx + 1))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        table.push_row(record.iter().map(normalize_cell).collect());
    }
    debug!(
        table = name,
        rows = table.height(),
        columns = table.width(),
        blank_records = skipped,
        "loaded csv table"
    );
    Ok(table)
}

/// Writes a table as headed CSV. Null cells are written empty.
pub fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {}", parent.display()))?;
    }
    let file =
        std::fs::File::create(path).with_context(|| format!("write csv: {}", path.display()))?;
    write_csv_to(table, file).with_context(|| format!("write csv: {}", path.display()))
}

pub fn write_csv_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.cells.iter().map(FieldValue::to_display_string))?;
    }
    writer.flush()?;
    Ok(())
}

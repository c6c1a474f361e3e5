//! In-memory tables.
//!
//! A [`Table`] is a named, column-ordered set of rows. Every row holds exactly
//! one cell per column; the mutating helpers keep that invariant.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::value::FieldValue;

/// Where a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrigin {
    /// Read from an input file.
    #[default]
    Source,
    /// Flattened out of a nested `features` cell.
    Feature,
    /// Computed by the pipeline (labels, scores).
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub origin: ColumnOrigin,
}

impl Column {
    pub fn new(name: impl Into<String>, origin: ColumnOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    pub fn source(name: impl Into<String>) -> Self {
        Self::new(name, ColumnOrigin::Source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Dense position of the row inside its table.
    pub ordinal: usize,
    pub cells: Vec<FieldValue>,
}

impl Row {
    pub fn get(&self, column: usize) -> &FieldValue {
        self.cells.get(column).unwrap_or(&FieldValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds an empty table whose columns all come from an input file.
    pub fn from_headers<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, headers.into_iter().map(Column::source).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of a column that must exist, or a schema mismatch naming it.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ModelError::schema_mismatch(&self.name, name))
    }

    /// Appends a row, padding or truncating it to the table width.
    pub fn push_row(&mut self, mut cells: Vec<FieldValue>) {
        cells.resize(self.columns.len(), FieldValue::Null);
        let ordinal = self.rows.len();
        self.rows.push(Row { ordinal, cells });
    }

    pub fn value(&self, row: usize, column: usize) -> &FieldValue {
        self.rows
            .get(row)
            .map_or(&FieldValue::Null, |r| r.get(column))
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &FieldValue> {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Writes a whole column. An existing column of the same name is
    /// overwritten in place and `true` is returned; otherwise the column is
    /// appended. Missing values are padded with null.
    pub fn set_column(
        &mut self,
        name: &str,
        origin: ColumnOrigin,
        values: Vec<FieldValue>,
    ) -> bool {
        let mut values = values.into_iter();
        match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].origin = origin;
                for row in &mut self.rows {
                    row.cells[idx] = values.next().unwrap_or_default();
                }
                true
            }
            None => {
                self.columns.push(Column::new(name, origin));
                for row in &mut self.rows {
                    row.cells.push(values.next().unwrap_or_default());
                }
                false
            }
        }
    }

    /// Removes a column by name. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.cells.remove(idx);
        }
        true
    }

    /// Keeps rows matching the predicate and returns how many were dropped.
    /// Ordinals are left untouched; call [`Table::reindex`] afterwards.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Applies `f` to every cell of one column.
    pub fn map_column<F>(&mut self, column: usize, mut f: F)
    where
        F: FnMut(&FieldValue) -> FieldValue,
    {
        for row in &mut self.rows {
            let next = f(&row.cells[column]);
            row.cells[column] = next;
        }
    }

    /// Re-derives row ordinals densely from zero.
    pub fn reindex(&mut self) {
        for (ordinal, row) in self.rows.iter_mut().enumerate() {
            row.ordinal = ordinal;
        }
    }

    /// Names of columns flattened from nested feature cells, in table order.
    pub fn feature_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.origin == ColumnOrigin::Feature)
            .map(|c| c.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::from_headers("predictions", ["record_id", "score"]);
        table.push_row(vec!["p1".into(), "0.9".into()]);
        table.push_row(vec!["p2".into()]);
        table
    }

    #[test]
    fn push_row_pads_to_width() {
        let table = sample();
        assert_eq!(table.height(), 2);
        assert!(table.value(1, 1).is_null());
        assert_eq!(table.rows()[1].ordinal, 1);
    }

    #[test]
    fn require_column_reports_table_and_column() {
        let table = sample();
        let err = table.require_column("features").unwrap_err();
        assert_eq!(err.missing_column(), Some("features"));
        assert!(err.to_string().contains("predictions"));
    }

    #[test]
    fn set_column_overwrites_existing() {
        let mut table = sample();
        let collided = table.set_column(
            "score",
            ColumnOrigin::Feature,
            vec![FieldValue::Number(1.0), FieldValue::Number(0.0)],
        );
        assert!(collided);
        assert_eq!(table.width(), 2);
        assert_eq!(table.value(0, 1), &FieldValue::Number(1.0));
        assert_eq!(table.feature_columns(), vec!["score"]);
    }

    #[test]
    fn set_column_appends_and_pads() {
        let mut table = sample();
        let collided = table.set_column("a", ColumnOrigin::Feature, vec![1.0.into()]);
        assert!(!collided);
        assert_eq!(table.width(), 3);
        assert!(table.value(1, 2).is_null());
    }

    #[test]
    fn retain_then_reindex() {
        let mut table = sample();
        let dropped = table.retain_rows(|row| row.get(0).as_str() == Some("p2"));
        assert_eq!(dropped, 1);
        assert_eq!(table.rows()[0].ordinal, 1);
        table.reindex();
        assert_eq!(table.rows()[0].ordinal, 0);
    }

    #[test]
    fn drop_column_reports_presence() {
        let mut table = sample();
        assert!(table.drop_column("score"));
        assert!(!table.drop_column("score"));
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["record_id"]);
        assert_eq!(table.rows()[0].cells.len(), 1);
    }
}

//! Conversion of reconciled tables into polars DataFrames.

use polars::prelude::{DataFrame, NamedFrom, Series};

use predlog_model::{FieldValue, Table};

use crate::error::Result;

enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

/// Integer when every non-null cell is a whole number, float when every
/// non-null cell is a number, boolean when every non-null cell is a boolean,
/// text otherwise. All-null columns are text.
fn column_kind<'a>(values: impl Iterator<Item = &'a FieldValue>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let next = match value {
            FieldValue::Null => continue,
            FieldValue::Number(v) if is_whole(*v) => ColumnKind::Integer,
            FieldValue::Number(_) => ColumnKind::Float,
            FieldValue::Bool(_) => ColumnKind::Boolean,
            FieldValue::Text(_) | FieldValue::Nested(_) => return ColumnKind::Text,
        };
        kind = match (kind, next) {
            (None, next) => Some(next),
            (Some(ColumnKind::Integer), ColumnKind::Integer) => Some(ColumnKind::Integer),
            (
                Some(ColumnKind::Integer | ColumnKind::Float),
                ColumnKind::Integer | ColumnKind::Float,
            ) => Some(ColumnKind::Float),
            (Some(ColumnKind::Boolean), ColumnKind::Boolean) => Some(ColumnKind::Boolean),
            _ => return ColumnKind::Text,
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn is_whole(v: f64) -> bool {
    v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64
}

/// Builds a DataFrame with one typed column per table column, in table order.
pub fn table_to_dataframe(table: &Table) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(table.width());
    for (idx, column) in table.columns().iter().enumerate() {
        let name = column.name.as_str();
        let column = match column_kind(table.column_values(idx)) {
            ColumnKind::Integer => {
                let values: Vec<Option<i64>> = table
                    .column_values(idx)
                    .map(|value| value.as_f64().map(|v| v as i64))
                    .collect();
                Series::new(name.into(), values).into()
            }
            ColumnKind::Float => {
                let values: Vec<Option<f64>> =
                    table.column_values(idx).map(FieldValue::as_f64).collect();
                Series::new(name.into(), values).into()
            }
            ColumnKind::Boolean => {
                let values: Vec<Option<bool>> = table
                    .column_values(idx)
                    .map(|value| match value {
                        FieldValue::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), values).into()
            }
            ColumnKind::Text => {
                let values: Vec<Option<String>> = table
                    .column_values(idx)
                    .map(|value| (!value.is_null()).then(|| value.to_display_string()))
                    .collect();
                Series::new(name.into(), values).into()
            }
        };
        columns.push(column);
    }
    DataFrame::new(columns).map_err(Into::into)
}

//! Bridge between [`Table`] and Polars `DataFrame`.
//!
//! Import maps every Polars value onto a [`Cell`]. Export picks one dtype per
//! column: `Float64` when every defined cell is a number, `Boolean` when every
//! defined cell is a boolean, `String` otherwise. Nested tables have no
//! DataFrame representation.

use polars::prelude::{
    AnyValue, Column as FrameColumn, DataFrame, IntoColumn, NamedFrom, PolarsError, Series,
};
use tabmod_model::{Cell, Column, Table};
use thiserror::Error;

/// Errors raised while converting between tables and DataFrames.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("column {column} holds nested tables, which a DataFrame cannot store")]
    NestedTable { column: String },
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Converts a Polars `AnyValue` to a [`Cell`].
///
/// `Null` becomes `Undefined`, integer and float types become numbers, and
/// any other dtype is kept as its display string.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use tabmod_common::any_to_cell;
/// use tabmod_model::Cell;
///
/// assert_eq!(any_to_cell(AnyValue::Null), Cell::Undefined);
/// assert_eq!(any_to_cell(AnyValue::Int32(42)), Cell::Number(42.0));
/// assert_eq!(any_to_cell(AnyValue::String("a")), Cell::string("a"));
/// ```
pub fn any_to_cell(value: AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => Cell::Undefined,
        AnyValue::Boolean(b) => Cell::Boolean(b),
        AnyValue::String(s) => Cell::String(s.to_string()),
        AnyValue::StringOwned(s) => Cell::String(s.to_string()),
        AnyValue::Int8(v) => Cell::Number(f64::from(v)),
        AnyValue::Int16(v) => Cell::Number(f64::from(v)),
        AnyValue::Int32(v) => Cell::Number(f64::from(v)),
        AnyValue::Int64(v) => Cell::Number(v as f64),
        AnyValue::UInt8(v) => Cell::Number(f64::from(v)),
        AnyValue::UInt16(v) => Cell::Number(f64::from(v)),
        AnyValue::UInt32(v) => Cell::Number(f64::from(v)),
        AnyValue::UInt64(v) => Cell::Number(v as f64),
        AnyValue::Float32(v) => Cell::Number(f64::from(v)),
        AnyValue::Float64(v) => Cell::Number(v),
        other => Cell::String(other.to_string()),
    }
}

/// Builds a [`Table`] from a DataFrame, keeping column order.
pub fn dataframe_to_table(df: &DataFrame) -> Result<Table, FrameError> {
    let height = df.height();
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let mut cells = Vec::with_capacity(height);
        for row in 0..height {
            cells.push(any_to_cell(column.get(row)?));
        }
        columns.push(Column::new(column.name().as_str(), cells));
    }
    let mut table = Table::new();
    table.set_columns(columns);
    Ok(table)
}

/// Builds a DataFrame from a [`Table`].
pub fn table_to_dataframe(table: &Table) -> Result<DataFrame, FrameError> {
    let mut columns: Vec<FrameColumn> = Vec::with_capacity(table.column_count());
    for column in table.columns() {
        columns.push(column_to_series(column)?.into_column());
    }
    Ok(DataFrame::new(columns)?)
}

fn column_to_series(column: &Column) -> Result<Series, FrameError> {
    let name = column.name.as_str().into();
    let defined = || column.cells.iter().filter(|c| !c.is_undefined());

    if column.cells.iter().any(Cell::is_table) {
        return Err(FrameError::NestedTable {
            column: column.name.clone(),
        });
    }
    if defined().all(|c| matches!(c, Cell::Number(_))) {
        let values: Vec<Option<f64>> = column.cells.iter().map(Cell::as_f64).collect();
        return Ok(Series::new(name, values));
    }
    if defined().all(|c| matches!(c, Cell::Boolean(_))) {
        let values: Vec<Option<bool>> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Boolean(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Ok(Series::new(name, values));
    }
    let values: Vec<Option<String>> = column
        .cells
        .iter()
        .map(|c| (!c.is_undefined()).then(|| c.to_string()))
        .collect();
    Ok(Series::new(name, values))
}

//! In-memory column table consumed by the modifier pipeline.
//!
//! A [`Table`] maps unique column names to equal-length cell sequences.
//! Columns keep insertion order; a row is the cross-section at one index.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::TableError;

/// A positional row, aligned to the table's column order.
pub type Row = Vec<Cell>;

/// A name-keyed row, in column order.
pub type RowObject = IndexMap<String, Cell>;

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// Column-ordered table.
///
/// Every write keeps all columns at the same length by padding shorter
/// columns with [`Cell::Undefined`].
///
/// The optional modified view is a secondary table written by partial-update
/// passes; it never takes part in equality or serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct Table {
    columns: Vec<Column>,
    #[serde(skip)]
    modified: Option<Box<Table>>,
}

/// Wire shape of a table, validated on the way in.
#[derive(Deserialize)]
struct TableData {
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<TableData> for Table {
    type Error = TableError;

    fn try_from(data: TableData) -> Result<Self, Self::Error> {
        let expected = data.columns.first().map_or(0, |c| c.cells.len());
        let mut table = Table::new();
        for column in data.columns {
            if table.column_index(&column.name).is_some() {
                return Err(TableError::DuplicateColumn { name: column.name });
            }
            if column.cells.len() != expected {
                return Err(TableError::LengthMismatch {
                    name: column.name,
                    expected,
                    actual: column.cells.len(),
                });
            }
            table.columns.push(column);
        }
        Ok(table)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, cells)` pairs.
    ///
    /// Later pairs with a repeated name replace earlier ones; ragged input is
    /// padded with `Undefined`.
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Cell>)>,
    {
        let mut table = Self::new();
        table.set_columns(
            columns
                .into_iter()
                .map(|(name, cells)| Column::new(name, cells)),
        );
        table
    }

    /// Build a table from name-keyed rows.
    pub fn from_row_objects(rows: impl IntoIterator<Item = RowObject>) -> Self {
        let mut table = Self::new();
        table.set_row_objects(rows, None);
        table
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }

    pub fn cell(&self, name: &str, row: usize) -> Option<&Cell> {
        self.column(name)?.get(row)
    }

    /// Row at `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| c.cells[index].clone()).collect())
    }

    /// Row at `index`, keyed by column name.
    pub fn row_object(&self, index: usize) -> Option<RowObject> {
        if index >= self.row_count() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.cells[index].clone()))
                .collect(),
        )
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.column_index(name).is_some())
    }

    /// Set or replace one column. An existing column keeps its position.
    pub fn set_column(&mut self, name: impl Into<String>, cells: Vec<Cell>) {
        let name = name.into();
        match self.column_index(&name) {
            Some(index) => self.columns[index].cells = cells,
            None => self.columns.push(Column::new(name, cells)),
        }
        self.align_lengths();
    }

    pub fn set_columns(&mut self, columns: impl IntoIterator<Item = Column>) {
        for column in columns {
            match self.column_index(&column.name) {
                Some(index) => self.columns[index].cells = column.cells,
                None => self.columns.push(column),
            }
        }
        self.align_lengths();
    }

    /// Write positional rows starting at `start` (default: append).
    ///
    /// Rows shorter than the column count pad with `Undefined`; extra cells
    /// are ignored. A table without columns has nowhere to put them.
    pub fn set_rows(&mut self, rows: impl IntoIterator<Item = Row>, start: Option<usize>) {
        let start = start.unwrap_or_else(|| self.row_count());
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start + offset;
            let mut cells = row.into_iter();
            for column in &mut self.columns {
                let cell = cells.next().unwrap_or_default();
                put_cell(&mut column.cells, index, cell);
            }
        }
        self.align_lengths();
    }

    /// Write name-keyed rows starting at `start` (default: append), creating
    /// columns that do not exist yet.
    pub fn set_row_objects(
        &mut self,
        rows: impl IntoIterator<Item = RowObject>,
        start: Option<usize>,
    ) {
        let start = start.unwrap_or_else(|| self.row_count());
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start + offset;
            for (name, cell) in row {
                let column_index = match self.column_index(&name) {
                    Some(existing) => existing,
                    None => {
                        self.columns.push(Column::new(name, Vec::new()));
                        self.columns.len() - 1
                    }
                };
                put_cell(&mut self.columns[column_index].cells, index, cell);
            }
            self.align_lengths();
        }
    }

    /// Delete the named columns, or all columns when `names` is `None`.
    /// Returns the removed columns in table order.
    pub fn delete_columns(&mut self, names: Option<&[&str]>) -> Vec<Column> {
        let Some(names) = names else {
            return std::mem::take(&mut self.columns);
        };
        let (removed, kept) = std::mem::take(&mut self.columns)
            .into_iter()
            .partition(|c| names.contains(&c.name.as_str()));
        self.columns = kept;
        removed
    }

    /// Remove every row, keeping the columns.
    pub fn delete_rows(&mut self) {
        for column in &mut self.columns {
            column.cells.clear();
        }
    }

    /// Rename `from` to `to` in place.
    ///
    /// An existing column named `to` is dropped first. Returns `false` when
    /// `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if self.column_index(from).is_none() {
            return false;
        }
        if from == to {
            return true;
        }
        self.columns.retain(|c| c.name != to);
        if let Some(index) = self.column_index(from) {
            self.columns[index].name = to.to_string();
        }
        true
    }

    /// Position of the first NaN or infinite cell, searching nested tables
    /// too. A nested hit reports the outer cell holding the subtable.
    pub fn first_non_finite(&self) -> Option<(&str, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .cells
                .iter()
                .position(|cell| match cell {
                    Cell::Table(inner) => inner.first_non_finite().is_some(),
                    other => other.is_non_finite(),
                })
                .map(|row| (column.name.as_str(), row))
        })
    }

    /// Clone the columns without the modified view.
    pub fn clone_data(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            modified: None,
        }
    }

    /// Secondary modified view, if a partial-update pass produced one.
    pub fn modified(&self) -> Option<&Table> {
        self.modified.as_deref()
    }

    pub fn set_modified(&mut self, modified: Table) {
        self.modified = Some(Box::new(modified));
    }

    pub fn take_modified(&mut self) -> Option<Table> {
        self.modified.take().map(|t| *t)
    }

    fn align_lengths(&mut self) {
        let len = self
            .columns
            .iter()
            .map(|c| c.cells.len())
            .max()
            .unwrap_or(0);
        for column in &mut self.columns {
            column.cells.resize(len, Cell::Undefined);
        }
    }
}

fn put_cell(cells: &mut Vec<Cell>, index: usize, cell: Cell) {
    if index < cells.len() {
        cells[index] = cell;
    } else {
        cells.resize(index, Cell::Undefined);
        cells.push(cell);
    }
}

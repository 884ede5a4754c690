//! Transpose rows and columns.
//!
//! Inverted form is marked by a column named [`COLUMN_NAMES`] holding the
//! original header. Every other column of an inverted table is named by the
//! original row index (`"0"`, `"1"`, ...). A table that carries the sentinel
//! without that shape is rejected rather than reverted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Column, Table};
use tracing::{debug, warn};

use crate::error::{ModifierError, Result};
use crate::event::{EventEmitter, EventKind, ModifierEvent};
use crate::modifier::{MODIFY, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;

/// Sentinel column holding the original header of an inverted table.
pub const COLUMN_NAMES: &str = "columnNames";

/// Invert takes no options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvertOptions {}

#[derive(Debug, Default)]
pub struct InvertModifier {
    options: InvertOptions,
    events: EventEmitter,
}

impl InvertModifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: &ModifierRecord) -> Result<Self> {
        let options = record.decode_options(ModifierKind::Invert)?;
        Ok(Self {
            options,
            events: EventEmitter::new(),
        })
    }

    fn apply(&self, table: &mut Table, detail: Option<&Value>) {
        if table.column_index(COLUMN_NAMES).is_none() {
            invert(table);
            return;
        }
        match revert_plan(table) {
            Ok(columns) => {
                debug!(columns = columns.len(), "reverting inverted table");
                table.delete_columns(None);
                table.set_columns(columns);
            }
            Err(error) => {
                warn!(%error, "table left unchanged");
                self.events.emit(
                    &ModifierEvent::new(EventKind::Error)
                        .with_detail(detail)
                        .with_table(table)
                        .with_error(&error),
                );
            }
        }
    }
}

/// Normal form to inverted form.
fn invert(table: &mut Table) {
    let header: Vec<Cell> = table.column_names().into_iter().map(Cell::String).collect();
    let rows = table.row_count();
    let mut columns: Vec<Column> = (0..rows)
        .map(|index| Column::new(index.to_string(), table.row(index).unwrap_or_default()))
        .collect();
    columns.push(Column::new(COLUMN_NAMES, header));

    debug!(rows, columns = table.column_count(), "inverting table");
    table.delete_columns(None);
    table.set_columns(columns);
}

/// Columns of the normal-form table encoded by an inverted one.
fn revert_plan(table: &Table) -> Result<Vec<Column>> {
    let collision = |reason: String| ModifierError::InvertCollision { reason };

    let header = table.column(COLUMN_NAMES).unwrap_or_default();
    let mut seen = HashSet::with_capacity(header.len());
    let mut names = Vec::with_capacity(header.len());
    for cell in header {
        let Some(name) = cell.as_str() else {
            return Err(collision(format!("header cell {cell} is not a string")));
        };
        if !seen.insert(name) {
            return Err(collision(format!("header repeats column {name}")));
        }
        names.push(name);
    }

    let sources: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|column| column.name != COLUMN_NAMES)
        .collect();
    for (index, column) in sources.iter().enumerate() {
        if column.name != index.to_string() {
            return Err(collision(format!(
                "expected column {index} at position {index}, found {}",
                column.name
            )));
        }
    }

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(field, name)| {
            let cells = sources
                .iter()
                .map(|column| column.cells[field].clone())
                .collect();
            Column::new(name, cells)
        })
        .collect())
}

impl Modifier for InvertModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Invert
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::Invert, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, MODIFY, table, detail, |table| {
            self.apply(table, detail);
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn sample() -> Table {
        Table::from_columns([
            ("x", vec![Cell::from(1), Cell::from(2)]),
            ("y", vec![Cell::from("a"), Cell::Undefined]),
            ("z", vec![Cell::from(true), Cell::from(false)]),
        ])
    }

    #[test]
    fn inverts_rows_into_indexed_columns() {
        let mut table = sample();
        InvertModifier::new().modify(&mut table, None);

        assert_eq!(table.column_names(), ["0", "1", "columnNames"]);
        assert_eq!(
            table.column("0").unwrap(),
            [Cell::from(1), Cell::from("a"), Cell::from(true)]
        );
        assert_eq!(
            table.column(COLUMN_NAMES).unwrap(),
            [Cell::from("x"), Cell::from("y"), Cell::from("z")]
        );
    }

    #[test]
    fn inverting_twice_restores_the_table() {
        let mut table = sample();
        let invert = InvertModifier::new();
        invert.modify(&mut table, None);
        invert.modify(&mut table, None);
        assert_eq!(table, sample());
    }

    #[test]
    fn empty_tables_round_trip() {
        let mut table = Table::new();
        let invert = InvertModifier::new();
        invert.modify(&mut table, None);
        assert_eq!(table.column_names(), ["columnNames"]);
        invert.modify(&mut table, None);
        assert!(table.is_empty());
    }

    #[test]
    fn sentinel_collision_leaves_table_unchanged_and_reports() {
        let original = Table::from_columns([
            ("columnNames", vec![Cell::from("a"), Cell::from("b")]),
            ("price", vec![Cell::from(1), Cell::from(2)]),
        ]);
        let mut table = original.clone();
        let invert = InvertModifier::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        invert.events().on(move |event| {
            if event.kind == EventKind::Error {
                let reason = event.error.map(ToString::to_string).unwrap_or_default();
                sink.lock().unwrap().push(reason);
            }
        });

        invert.modify(&mut table, None);

        assert_eq!(table, original);
        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("price"), "{}", errors[0]);
    }

    #[test]
    fn non_string_header_is_a_collision() {
        let table = Table::from_columns([
            ("0", vec![Cell::from(1)]),
            ("columnNames", vec![Cell::from(7)]),
        ]);
        let err = revert_plan(&table).unwrap_err();
        assert!(matches!(err, ModifierError::InvertCollision { .. }));
    }

    #[test]
    fn partial_update_writes_modified_view() {
        let mut table = sample();
        InvertModifier::new().modify_cell(&mut table, "x", 0, &Cell::from(9), None);
        assert_eq!(table, sample());
        assert_eq!(
            table.modified().unwrap().column_names(),
            ["0", "1", "columnNames"]
        );
    }
}

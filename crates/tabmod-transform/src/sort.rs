//! Sort rows by one column, or write each row's rank into another column.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Row, Table};
use tracing::debug;

use crate::error::Result;
use crate::event::EventEmitter;
use crate::modifier::{EXECUTE, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Options for [`SortModifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortOptions {
    pub direction: SortDirection,
    /// Column whose values decide the order.
    pub order_by_column: String,
    /// When set, rows stay in place and their 0-based rank is written here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_in_column: Option<String>,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            direction: SortDirection::Desc,
            order_by_column: "y".to_string(),
            order_in_column: None,
        }
    }
}

impl SortOptions {
    #[must_use]
    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_order_by_column(mut self, column: impl Into<String>) -> Self {
        self.order_by_column = column.into();
        self
    }

    #[must_use]
    pub fn with_order_in_column(mut self, column: impl Into<String>) -> Self {
        self.order_in_column = Some(column.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct SortModifier {
    options: SortOptions,
    events: EventEmitter,
}

impl SortModifier {
    pub fn new(options: SortOptions) -> Self {
        Self {
            options,
            events: EventEmitter::new(),
        }
    }

    pub fn from_record(record: &ModifierRecord) -> Result<Self> {
        Ok(Self::new(record.decode_options(ModifierKind::Sort)?))
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    fn apply(&self, table: &mut Table) {
        let Some(order) = table
            .column(&self.options.order_by_column)
            .map(|cells| sorted_indices(cells, self.options.direction))
        else {
            debug!(
                column = %self.options.order_by_column,
                "sort column missing, rows left in place"
            );
            return;
        };

        match &self.options.order_in_column {
            Some(target) => {
                let mut ranks = vec![Cell::Undefined; order.len()];
                for (rank, &index) in order.iter().enumerate() {
                    ranks[index] = Cell::Number(rank as f64);
                }
                table.set_column(target.as_str(), ranks);
            }
            None => {
                let rows: Vec<Row> = order.iter().filter_map(|&index| table.row(index)).collect();
                table.set_rows(rows, Some(0));
            }
        }
        debug!(
            column = %self.options.order_by_column,
            direction = ?self.options.direction,
            rows = order.len(),
            "sorted rows"
        );
    }
}

/// Original row indices in sorted order. The sort is stable in both
/// directions: rows with equal keys keep their relative order.
///
/// NaN and nested tables have no place in the order and trail every other
/// value whichever way the rest is sorted.
pub fn sorted_indices(cells: &[Cell], direction: SortDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cells.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&cells[a], &cells[b]);
        match (a.sorts_last(), b.sorts_last()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => a.sort_cmp(b),
            (false, false) => match direction {
                SortDirection::Asc => a.sort_cmp(b),
                SortDirection::Desc => a.sort_cmp(b).reverse(),
            },
        }
    });
    order
}

impl Modifier for SortModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Sort
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::Sort, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, EXECUTE, table, detail, |table| {
            self.apply(table);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(values: Vec<Cell>) -> Table {
        let labels = (0..values.len()).map(|i| Cell::from(i as i32)).collect();
        Table::from_columns([("y", values), ("label", labels)])
    }

    fn nums(values: &[i32]) -> Vec<Cell> {
        values.iter().map(|&v| Cell::from(v)).collect()
    }

    fn column(table: &Table, name: &str) -> Vec<Cell> {
        table.column(name).unwrap().to_vec()
    }

    #[test]
    fn asc_and_desc_orders() {
        let values = vec![Cell::from(3), Cell::from(1), Cell::from(2)];

        let mut asc = labeled(values.clone());
        SortModifier::new(SortOptions::default().with_direction(SortDirection::Asc))
            .modify(&mut asc, None);
        assert_eq!(column(&asc, "y"), nums(&[1, 2, 3]));
        assert_eq!(column(&asc, "label"), nums(&[1, 2, 0]));

        let mut desc = labeled(values);
        SortModifier::default().modify(&mut desc, None);
        assert_eq!(column(&desc, "y"), nums(&[3, 2, 1]));
        assert_eq!(column(&desc, "label"), nums(&[0, 2, 1]));
    }

    #[test]
    fn ties_keep_original_order_in_both_directions() {
        let values = vec![Cell::from(1), Cell::from(1), Cell::from(2)];

        let mut asc = labeled(values.clone());
        SortModifier::new(SortOptions::default().with_direction(SortDirection::Asc))
            .modify(&mut asc, None);
        assert_eq!(column(&asc, "label"), nums(&[0, 1, 2]));

        let mut desc = labeled(values);
        SortModifier::default().modify(&mut desc, None);
        assert_eq!(column(&desc, "label"), nums(&[2, 0, 1]));
    }

    #[test]
    fn undefined_sorts_as_zero() {
        let mut table = labeled(vec![Cell::from(1), Cell::Undefined, Cell::from(-1)]);
        SortModifier::new(SortOptions::default().with_direction(SortDirection::Asc))
            .modify(&mut table, None);
        assert_eq!(column(&table, "label"), nums(&[2, 1, 0]));
    }

    #[test]
    fn nan_and_tables_trail_in_both_directions() {
        let cells = vec![
            Cell::Number(f64::NAN),
            Cell::from(1),
            Cell::table(Table::new()),
            Cell::from("b"),
            Cell::from(2),
        ];
        assert_eq!(sorted_indices(&cells, SortDirection::Asc), [1, 4, 3, 0, 2]);
        assert_eq!(sorted_indices(&cells, SortDirection::Desc), [3, 4, 1, 0, 2]);
    }

    #[test]
    fn missing_column_leaves_table_unchanged() {
        let mut table = labeled(vec![Cell::from(3), Cell::from(1)]);
        let before = table.clone();
        SortModifier::new(SortOptions::default().with_order_by_column("nope"))
            .modify(&mut table, None);
        assert_eq!(table, before);
    }

    #[test]
    fn order_in_column_writes_ranks() {
        let mut table = labeled(vec![Cell::from(3), Cell::from(1), Cell::from(2)]);
        SortModifier::new(
            SortOptions::default()
                .with_direction(SortDirection::Asc)
                .with_order_in_column("rank"),
        )
        .modify(&mut table, None);
        // Row order untouched.
        assert_eq!(column(&table, "y"), nums(&[3, 1, 2]));
        assert_eq!(column(&table, "rank"), nums(&[2, 0, 1]));
    }

    #[test]
    fn options_default_merge_from_partial_record() {
        let record =
            ModifierRecord::from_json(r#"{"kind":"Sort","options":{"direction":"asc"}}"#).unwrap();
        let sort = SortModifier::from_record(&record).unwrap();
        assert_eq!(sort.options().direction, SortDirection::Asc);
        assert_eq!(sort.options().order_by_column, "y");
        assert_eq!(sort.options().order_in_column, None);
    }
}

//! Partition rows into per-value subtables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Column, Primitive, Table};
use tracing::debug;

use crate::error::{ModifierError, Result};
use crate::event::EventEmitter;
use crate::modifier::{MODIFY, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;

/// Output column holding the grouping column's name for every group.
pub const GROUP_BY_COLUMN: &str = "groupBy";
/// Output column holding each group's subtable.
pub const TABLE_COLUMN: &str = "table";
/// Output column holding each group's key value.
pub const VALUE_COLUMN: &str = "value";

/// Options for [`GroupModifier`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupOptions {
    /// Column to group by. Defaults to the table's first column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_column: Option<String>,
    /// When set, only these values form groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<Primitive>>,
    /// Values that never form groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_values: Option<Vec<Primitive>>,
}

impl GroupOptions {
    #[must_use]
    pub fn with_group_column(mut self, column: impl Into<String>) -> Self {
        self.group_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_valid_values(mut self, values: Vec<Primitive>) -> Self {
        self.valid_values = Some(values);
        self
    }

    #[must_use]
    pub fn with_invalid_values(mut self, values: Vec<Primitive>) -> Self {
        self.invalid_values = Some(values);
        self
    }

    /// Reject NaN and infinite list entries; JSON cannot carry them.
    pub fn validate(&self) -> Result<()> {
        let lists = [
            ("validValues", &self.valid_values),
            ("invalidValues", &self.invalid_values),
        ];
        for (field, values) in lists {
            let Some(values) = values else { continue };
            if let Some(index) = values.iter().position(Primitive::is_non_finite) {
                return Err(ModifierError::NonFiniteOption {
                    kind: ModifierKind::Group,
                    field: format!("{field}[{index}]"),
                });
            }
        }
        Ok(())
    }

    /// Whether a key value passes the allow/deny lists (strict equality).
    fn accepts(&self, value: &Cell) -> bool {
        if let Some(invalid) = &self.invalid_values
            && invalid.iter().any(|p| p.matches(value))
        {
            return false;
        }
        match &self.valid_values {
            Some(valid) => valid.iter().any(|p| p.matches(value)),
            None => true,
        }
    }
}

/// Group modifier.
///
/// Replaces the whole column set with `groupBy`, `table` and `value`; one
/// row per distinct retained key, in first-seen order. Each subtable is a
/// fresh table holding that key's rows in original order.
#[derive(Debug, Default)]
pub struct GroupModifier {
    options: GroupOptions,
    events: EventEmitter,
}

impl GroupModifier {
    /// Build a group modifier. Fails when an allow/deny entry is NaN or
    /// infinite.
    pub fn new(options: GroupOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            events: EventEmitter::new(),
        })
    }

    pub fn from_record(record: &ModifierRecord) -> Result<Self> {
        Self::new(record.decode_options(ModifierKind::Group)?)
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    fn apply(&self, table: &mut Table) {
        let group_column = self
            .options
            .group_column
            .clone()
            .or_else(|| table.column_names().into_iter().next())
            .unwrap_or_default();

        let mut keys: Vec<Cell> = Vec::new();
        let mut groups: Vec<Table> = Vec::new();
        if let Some(values) = table.column(&group_column) {
            for (index, value) in values.iter().enumerate() {
                if value.is_undefined() || value.is_table() || !self.options.accepts(value) {
                    continue;
                }
                match keys.iter().position(|key| key == value) {
                    Some(group) => groups[group].set_rows(table.row(index), None),
                    None => {
                        keys.push(value.clone());
                        groups.push(Table::from_row_objects(table.row_object(index)));
                    }
                }
            }
        }

        debug!(
            column = %group_column,
            rows = table.row_count(),
            groups = keys.len(),
            "grouped rows"
        );
        let group_by = vec![Cell::string(group_column.as_str()); keys.len()];
        table.delete_columns(None);
        table.set_columns([
            Column::new(GROUP_BY_COLUMN, group_by),
            Column::new(TABLE_COLUMN, groups.into_iter().map(Cell::table).collect()),
            Column::new(VALUE_COLUMN, keys),
        ]);
    }
}

impl Modifier for GroupModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Group
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::Group, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, MODIFY, table, detail, |table| self.apply(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Table {
        Table::from_columns([
            ("k", vec![Cell::from("a"), Cell::from("b"), Cell::from("a")]),
            ("n", vec![Cell::from(1), Cell::from(2), Cell::from(3)]),
        ])
    }

    fn subtable(table: &Table, group: usize) -> &Table {
        table
            .cell(TABLE_COLUMN, group)
            .and_then(Cell::as_table)
            .unwrap()
    }

    #[test]
    fn groups_in_first_seen_order() {
        let mut table = letters();
        GroupModifier::default().modify(&mut table, None);

        assert_eq!(table.column_names(), ["groupBy", "table", "value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column(VALUE_COLUMN).unwrap(),
            [Cell::from("a"), Cell::from("b")]
        );
        assert_eq!(
            table.column(GROUP_BY_COLUMN).unwrap(),
            [Cell::from("k"), Cell::from("k")]
        );

        let a = subtable(&table, 0);
        assert_eq!(a.column_names(), ["k", "n"]);
        assert_eq!(a.column("n").unwrap(), [Cell::from(1), Cell::from(3)]);
        assert_eq!(subtable(&table, 1).row_count(), 1);
    }

    #[test]
    fn invalid_values_are_dropped_without_empty_groups() {
        let mut table = letters();
        GroupModifier::new(GroupOptions::default().with_invalid_values(vec!["a".into()]))
            .unwrap()
            .modify(&mut table, None);
        assert_eq!(table.column(VALUE_COLUMN).unwrap(), [Cell::from("b")]);
    }

    #[test]
    fn valid_values_allow_list() {
        let mut table = letters();
        GroupModifier::new(GroupOptions::default().with_valid_values(vec!["a".into()]))
            .unwrap()
            .modify(&mut table, None);
        assert_eq!(table.row_count(), 1);
        assert_eq!(subtable(&table, 0).row_count(), 2);
    }

    #[test]
    fn undefined_and_nested_keys_are_skipped() {
        let mut table = Table::from_columns([(
            "k",
            vec![Cell::Undefined, Cell::table(Table::new()), Cell::from(1)],
        )]);
        GroupModifier::default().modify(&mut table, None);
        assert_eq!(table.column(VALUE_COLUMN).unwrap(), [Cell::from(1)]);
    }

    #[test]
    fn keys_use_strict_equality() {
        let mut table = Table::from_columns([(
            "k",
            vec![Cell::from(1), Cell::from("1"), Cell::from(true)],
        )]);
        GroupModifier::default().modify(&mut table, None);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn non_finite_list_entries_are_rejected() {
        let options = GroupOptions::default()
            .with_valid_values(vec!["a".into()])
            .with_invalid_values(vec![1.into(), f64::NEG_INFINITY.into()]);
        let err = GroupModifier::new(options).unwrap_err();
        assert!(matches!(
            &err,
            ModifierError::NonFiniteOption { kind: ModifierKind::Group, field }
                if field == "invalidValues[1]"
        ));
    }

    #[test]
    fn missing_group_column_yields_empty_groups() {
        let mut table = letters();
        GroupModifier::new(GroupOptions::default().with_group_column("zzz"))
            .unwrap()
            .modify(&mut table, None);
        assert_eq!(table.column_names(), ["groupBy", "table", "value"]);
        assert_eq!(table.row_count(), 0);
    }
}

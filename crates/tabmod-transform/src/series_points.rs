//! Rename columns to alias names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Column, Row, Table};
use tracing::{debug, trace};

use crate::error::Result;
use crate::event::EventEmitter;
use crate::modifier::{MODIFY, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;

/// Options for [`SeriesPointsModifier`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesPointsOptions {
    /// Alias name to source column name, applied in map order.
    pub alias_map: IndexMap<String, String>,
}

impl SeriesPointsOptions {
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, source: impl Into<String>) -> Self {
        self.alias_map.insert(alias.into(), source.into());
        self
    }
}

/// Column rename modifier.
///
/// Renames run one after another, so a later entry sees the names produced
/// by earlier ones. Renaming onto an existing name replaces that column.
#[derive(Debug, Default)]
pub struct SeriesPointsModifier {
    options: SeriesPointsOptions,
    events: EventEmitter,
}

impl SeriesPointsModifier {
    pub fn new(options: SeriesPointsOptions) -> Self {
        Self {
            options,
            events: EventEmitter::new(),
        }
    }

    pub fn from_record(record: &ModifierRecord) -> Result<Self> {
        Ok(Self::new(record.decode_options(ModifierKind::SeriesPoints)?))
    }

    pub fn options(&self) -> &SeriesPointsOptions {
        &self.options
    }

    fn apply(&self, table: &mut Table) {
        let mut renamed = 0usize;
        for (alias, source) in &self.options.alias_map {
            if table.rename_column(source, alias) {
                renamed += 1;
            } else {
                trace!(%source, %alias, "rename source missing");
            }
        }
        debug!(renamed, aliases = self.options.alias_map.len(), "renamed columns");
    }
}

impl Modifier for SeriesPointsModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::SeriesPoints
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::SeriesPoints, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, MODIFY, table, detail, |table| self.apply(table))
    }

    // Partial updates rename the table itself rather than a modified view.

    fn modify_cell<'t>(
        &self,
        table: &'t mut Table,
        _column: &str,
        _row_index: usize,
        _value: &Cell,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        self.modify(table, detail)
    }

    fn modify_columns<'t>(
        &self,
        table: &'t mut Table,
        _columns: &[Column],
        _row_index: usize,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        self.modify(table, detail)
    }

    fn modify_rows<'t>(
        &self,
        table: &'t mut Table,
        _rows: &[Row],
        _row_index: usize,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        self.modify(table, detail)
    }
}

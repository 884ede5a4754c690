//! The modifier contract shared by every table transformation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Column, Row, Table};

use crate::error::{ModifierError, Result};
use crate::event::{EventEmitter, EventKind, ModifierEvent};
use crate::record::ModifierRecord;

/// Closed set of modifier kinds. The discriminator string of each kind is
/// its variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModifierKind {
    Chain,
    Sort,
    Range,
    Group,
    Invert,
    SeriesPoints,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 6] = [
        Self::Chain,
        Self::Sort,
        Self::Range,
        Self::Group,
        Self::Invert,
        Self::SeriesPoints,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chain => "Chain",
            Self::Sort => "Sort",
            Self::Range => "Range",
            Self::Group => "Group",
            Self::Invert => "Invert",
            Self::SeriesPoints => "SeriesPoints",
        }
    }

    /// Returns a short human-readable description of the transformation.
    pub fn description(self) -> &'static str {
        match self {
            Self::Chain => "Apply child modifiers in sequence",
            Self::Sort => "Reorder rows by a column, or write rank indices",
            Self::Range => "Keep rows whose values fall inside configured ranges",
            Self::Group => "Partition rows into per-value subtables",
            Self::Invert => "Transpose rows and columns",
            Self::SeriesPoints => "Rename columns to alias names",
        }
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a discriminator names no known kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown modifier kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for ModifierKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// A named, configurable transformation of a [`Table`].
///
/// `modify` mutates the table in place and hands the same table back, so
/// calls can be fed forward. Options are fixed at construction.
///
/// The partial-update methods are a seam for incremental work. Their default
/// ignores the partial payload and recomputes the whole transform on a clone,
/// storing the result as the table's modified view; see [`recompute_modified`].
pub trait Modifier: fmt::Debug + Send + Sync {
    fn kind(&self) -> ModifierKind;

    fn events(&self) -> &EventEmitter;

    /// The kind-specific options as a JSON object.
    fn options_json(&self) -> Result<Value>;

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table;

    /// Nested modifiers, for composites. Leaves have none.
    fn children(&self) -> &[Arc<dyn Modifier>] {
        &[]
    }

    fn modify_cell<'t>(
        &self,
        table: &'t mut Table,
        _column: &str,
        _row_index: usize,
        _value: &Cell,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        recompute_modified(self, table, detail)
    }

    fn modify_columns<'t>(
        &self,
        table: &'t mut Table,
        _columns: &[Column],
        _row_index: usize,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        recompute_modified(self, table, detail)
    }

    fn modify_rows<'t>(
        &self,
        table: &'t mut Table,
        _rows: &[Row],
        _row_index: usize,
        detail: Option<&Value>,
    ) -> &'t mut Table {
        recompute_modified(self, table, detail)
    }

    /// Serialize to a `{kind, options}` record.
    fn to_record(&self) -> Result<ModifierRecord> {
        Ok(ModifierRecord::new(self.kind(), self.options_json()?))
    }
}

/// Run the full transform on a clone of `table` and store the clone as the
/// table's modified view. The table's own columns are left untouched.
pub fn recompute_modified<'t, M>(
    modifier: &M,
    table: &'t mut Table,
    detail: Option<&Value>,
) -> &'t mut Table
where
    M: Modifier + ?Sized,
{
    let mut scratch = table.clone_data();
    modifier.modify(&mut scratch, detail);
    table.set_modified(scratch);
    table
}

/// Serialize an options struct for `kind`.
pub(crate) fn options_to_json<T: Serialize>(kind: ModifierKind, options: &T) -> Result<Value> {
    serde_json::to_value(options).map_err(|source| ModifierError::SerializeOptions { kind, source })
}

/// Emit `before`, run `body`, emit `after`, and hand the table back.
pub(crate) fn run_with_events<'t>(
    events: &EventEmitter,
    (before, after): (EventKind, EventKind),
    table: &'t mut Table,
    detail: Option<&Value>,
    body: impl FnOnce(&mut Table),
) -> &'t mut Table {
    events.emit(
        &ModifierEvent::new(before)
            .with_detail(detail)
            .with_table(table),
    );
    body(table);
    events.emit(
        &ModifierEvent::new(after)
            .with_detail(detail)
            .with_table(table),
    );
    table
}

/// Lifecycle event pair for modifiers that report `execute`.
pub(crate) const EXECUTE: (EventKind, EventKind) = (EventKind::Execute, EventKind::AfterExecute);

/// Lifecycle event pair for modifiers that report `modify`.
pub(crate) const MODIFY: (EventKind, EventKind) = (EventKind::Modify, EventKind::AfterModify);

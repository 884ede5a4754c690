//! Keep only rows whose value falls inside at least one configured range.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::{Cell, Primitive, Row, Table};
use tracing::{debug, trace};

use crate::error::{ModifierError, Result};
use crate::event::EventEmitter;
use crate::modifier::{MODIFY, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;

/// An inclusive `[min_value, max_value]` bound on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeSpec {
    pub column: String,
    pub min_value: Primitive,
    pub max_value: Primitive,
}

impl RangeSpec {
    pub fn new(
        column: impl Into<String>,
        min_value: impl Into<Primitive>,
        max_value: impl Into<Primitive>,
    ) -> Self {
        Self {
            column: column.into(),
            min_value: min_value.into(),
            max_value: max_value.into(),
        }
    }

    /// Whether both bounds share one type, as strict mode requires.
    pub fn has_uniform_bounds(&self) -> bool {
        self.min_value.primitive_type() == self.max_value.primitive_type()
    }

    /// Whether `cell` lies inside the bounds.
    ///
    /// Only boolean, number and string cells are comparable. Under `strict`
    /// the cell must also share the bounds' type.
    pub fn contains(&self, cell: &Cell, strict: bool) -> bool {
        let Some(cell_type) = cell.primitive_type() else {
            return false;
        };
        if strict && cell_type != self.min_value.primitive_type() {
            return false;
        }
        matches!(
            cell.loose_cmp(&self.min_value),
            Some(Ordering::Greater | Ordering::Equal)
        ) && matches!(
            cell.loose_cmp(&self.max_value),
            Some(Ordering::Less | Ordering::Equal)
        )
    }
}

/// Options for [`RangeModifier`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RangeOptions {
    pub ranges: Vec<RangeSpec>,
    pub strict: bool,
}

impl RangeOptions {
    #[must_use]
    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.ranges.push(range);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reject NaN and infinite bounds. JSON writes them as `null`, so a
    /// modifier holding one could not be rebuilt from its record.
    pub fn validate(&self) -> Result<()> {
        for (index, range) in self.ranges.iter().enumerate() {
            for (field, bound) in [("minValue", &range.min_value), ("maxValue", &range.max_value)] {
                if bound.is_non_finite() {
                    return Err(ModifierError::NonFiniteOption {
                        kind: ModifierKind::Range,
                        field: format!("ranges[{index}].{field}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Range filter.
///
/// Ranges are evaluated independently and their matches concatenated in
/// range order. A row inside two ranges therefore appears twice.
#[derive(Debug, Default)]
pub struct RangeModifier {
    options: RangeOptions,
    events: EventEmitter,
}

impl RangeModifier {
    /// Build a range filter. Fails when a bound is NaN or infinite.
    pub fn new(options: RangeOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            events: EventEmitter::new(),
        })
    }

    pub fn from_record(record: &ModifierRecord) -> Result<Self> {
        Self::new(record.decode_options(ModifierKind::Range)?)
    }

    pub fn options(&self) -> &RangeOptions {
        &self.options
    }

    /// Rows selected by the configured ranges, in output order.
    pub fn matching_rows(&self, table: &Table) -> Vec<Row> {
        let strict = self.options.strict;
        let mut rows = Vec::new();
        for range in &self.options.ranges {
            if strict && !range.has_uniform_bounds() {
                trace!(column = %range.column, "skipping range with mixed bound types");
                continue;
            }
            let Some(cells) = table.column(&range.column) else {
                continue;
            };
            for (index, cell) in cells.iter().enumerate() {
                if range.contains(cell, strict) {
                    rows.extend(table.row(index));
                }
            }
        }
        rows
    }

    fn apply(&self, table: &mut Table) {
        if self.options.ranges.is_empty() {
            return;
        }
        let before = table.row_count();
        let rows = self.matching_rows(table);
        table.delete_rows();
        table.set_rows(rows, Some(0));
        debug!(before, after = table.row_count(), "range filter applied");
    }
}

impl Modifier for RangeModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Range
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::Range, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, MODIFY, table, detail, |table| self.apply(table))
    }
}

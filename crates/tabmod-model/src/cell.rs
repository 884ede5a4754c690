//! Cell values stored in a [`Table`].
//!
//! A cell is one of boolean, number, string, undefined, or a nested table.
//! The comparable subset (boolean, number, string) is modelled separately as
//! [`Primitive`] so range bounds and group filters cannot hold a table.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Table;

/// One value within a table column.
///
/// Serializes untagged: `true`, `1.5`, `"text"`, `null`, or a table object.
/// JSON has no NaN or infinity, so serde_json writes such numbers as `null`,
/// which reads back as `Undefined`. Writers check
/// [`Table::first_non_finite`] before serializing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Boolean(bool),
    Number(f64),
    String(String),
    #[default]
    Undefined,
    Table(Box<Table>),
}

/// A comparable scalar: the cell types that range bounds and group
/// allow/deny lists are expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// Runtime type tag of a [`Primitive`] or primitive [`Cell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Number,
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Borrowed view over either a primitive cell or a [`Primitive`].
#[derive(Clone, Copy)]
enum Scalar<'a> {
    Boolean(bool),
    Number(f64),
    String(&'a str),
}

impl Scalar<'_> {
    fn to_number(self) -> f64 {
        match self {
            Scalar::Boolean(b) => f64::from(u8::from(b)),
            Scalar::Number(n) => n,
            Scalar::String(s) => coerce_str_to_number(s),
        }
    }
}

/// Numeric coercion of a string: surrounding whitespace is ignored, an empty
/// string is zero, anything unparsable is NaN.
fn coerce_str_to_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    // `f64::from_str` also accepts "inf"/"nan" spellings; those stay NaN here.
    if trimmed.chars().any(|ch| ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn loose_cmp(left: Scalar<'_>, right: Scalar<'_>) -> Option<Ordering> {
    if let (Scalar::String(a), Scalar::String(b)) = (left, right) {
        return Some(a.cmp(b));
    }
    left.to_number().partial_cmp(&right.to_number())
}

impl Cell {
    /// Builds a string cell.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Builds a nested-table cell.
    pub fn table(table: Table) -> Self {
        Self::Table(Box::new(table))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// NaN or an infinity.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Self::Number(n) if !n.is_finite())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Type tag for boolean, number and string cells; `None` otherwise.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            Self::Boolean(_) => Some(PrimitiveType::Boolean),
            Self::Number(_) => Some(PrimitiveType::Number),
            Self::String(_) => Some(PrimitiveType::String),
            Self::Undefined | Self::Table(_) => None,
        }
    }

    /// Converts a boolean, number or string cell into a [`Primitive`].
    pub fn to_primitive(&self) -> Option<Primitive> {
        match self {
            Self::Boolean(b) => Some(Primitive::Boolean(*b)),
            Self::Number(n) => Some(Primitive::Number(*n)),
            Self::String(s) => Some(Primitive::String(s.clone())),
            Self::Undefined | Self::Table(_) => None,
        }
    }

    fn scalar(&self) -> Option<Scalar<'_>> {
        match self {
            Self::Boolean(b) => Some(Scalar::Boolean(*b)),
            Self::Number(n) => Some(Scalar::Number(*n)),
            Self::String(s) => Some(Scalar::String(s)),
            Self::Undefined | Self::Table(_) => None,
        }
    }

    /// Loose comparison against a primitive bound.
    ///
    /// Two strings compare lexically. Every other pairing compares
    /// numerically after coercion (booleans as 0/1, strings parsed, the
    /// empty string as 0). Returns `None` when this cell is not primitive or
    /// either side coerces to NaN.
    pub fn loose_cmp(&self, other: &Primitive) -> Option<Ordering> {
        loose_cmp(self.scalar()?, other.scalar())
    }

    /// Total order used for sorting rows.
    ///
    /// `Undefined` and booleans count as numbers (0, 0/1). Numbers order by
    /// value and every number sorts before every string. NaN sorts after
    /// strings, and nested tables sort after everything, tying with each
    /// other.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (SortKey::String(a), SortKey::String(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Whether this cell has no place in an ordered sequence (NaN or a
    /// nested table). Such cells trail the others in either sort direction.
    pub fn sorts_last(&self) -> bool {
        matches!(self.sort_key(), SortKey::NaN | SortKey::Table)
    }

    fn sort_key(&self) -> SortKey<'_> {
        match self {
            Self::Undefined => SortKey::Number(0.0),
            Self::Boolean(b) => SortKey::Number(f64::from(u8::from(*b))),
            Self::Number(n) if n.is_nan() => SortKey::NaN,
            Self::Number(n) => SortKey::Number(*n),
            Self::String(s) => SortKey::String(s),
            Self::Table(_) => SortKey::Table,
        }
    }
}

enum SortKey<'a> {
    Number(f64),
    String(&'a str),
    NaN,
    Table,
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::String(_) => 1,
            SortKey::NaN => 2,
            SortKey::Table => 3,
        }
    }
}

impl Primitive {
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::Boolean(_) => PrimitiveType::Boolean,
            Self::Number(_) => PrimitiveType::Number,
            Self::String(_) => PrimitiveType::String,
        }
    }

    /// NaN or an infinity, neither of which has a JSON form.
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Self::Number(n) if !n.is_finite())
    }

    fn scalar(&self) -> Scalar<'_> {
        match self {
            Self::Boolean(b) => Scalar::Boolean(*b),
            Self::Number(n) => Scalar::Number(*n),
            Self::String(s) => Scalar::String(s),
        }
    }

    /// Strict equality against a cell: same type and same value.
    pub fn matches(&self, cell: &Cell) -> bool {
        match (self, cell) {
            (Self::Boolean(a), Cell::Boolean(b)) => a == b,
            (Self::Number(a), Cell::Number(b)) => a == b,
            (Self::String(a), Cell::String(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Primitive> for Cell {
    fn from(value: Primitive) -> Self {
        match value {
            Primitive::Boolean(b) => Self::Boolean(b),
            Primitive::Number(n) => Self::Number(n),
            Primitive::String(s) => Self::String(s),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Table> for Cell {
    fn from(value: Table) -> Self {
        Self::table(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Undefined, Into::into)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Primitive {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::Undefined => Ok(()),
            Self::Table(t) => write!(f, "[table {}x{}]", t.row_count(), t.column_count()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

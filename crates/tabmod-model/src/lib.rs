//! Table collaborator for the tabular modifier pipeline.
//!
//! - **cell**: cell values, the comparable [`Primitive`] subset, and the
//!   loose/sort comparisons modifiers rely on
//! - **table**: the column-ordered in-memory [`Table`]
//! - **error**: validation errors for tables built from external input

pub mod cell;
pub mod error;
pub mod table;

pub use cell::{Cell, Primitive, PrimitiveType};
pub use error::{Result, TableError};
pub use table::{Column, Row, RowObject, Table};

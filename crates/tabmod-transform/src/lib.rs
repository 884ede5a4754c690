//! Composable table modifiers.
//!
//! Every modifier implements [`Modifier`]: it mutates a [`Table`] in place,
//! emits lifecycle events around the work, and serializes to a
//! [`ModifierRecord`]. Records are turned back into modifiers through an
//! explicit [`ModifierRegistry`].
//!
//! - **chain**: apply child modifiers in stored or reverse order
//! - **sort**: stable row sort, or rank indices written to a column
//! - **range**: keep rows inside inclusive value ranges
//! - **group**: partition rows into per-value subtables
//! - **invert**: transpose rows and columns
//! - **series_points**: rename columns to aliases
//!
//! [`Table`]: tabmod_model::Table

pub mod chain;
pub mod error;
pub mod event;
pub mod group;
pub mod invert;
pub mod modifier;
pub mod range;
pub mod record;
pub mod registry;
pub mod series_points;
pub mod sort;

pub use chain::{ChainModifier, ChainOptions};
pub use error::{ModifierError, Result};
pub use event::{EventEmitter, EventKind, ModifierEvent, Subscription};
pub use group::{GroupModifier, GroupOptions};
pub use invert::{COLUMN_NAMES, InvertModifier, InvertOptions};
pub use modifier::{Modifier, ModifierKind, UnknownKind, recompute_modified};
pub use range::{RangeModifier, RangeOptions, RangeSpec};
pub use record::{ModifierRecord, RECORD_VERSION};
pub use registry::{ModifierFactory, ModifierRegistry};
pub use series_points::{SeriesPointsModifier, SeriesPointsOptions};
pub use sort::{SortDirection, SortModifier, SortOptions, sorted_indices};

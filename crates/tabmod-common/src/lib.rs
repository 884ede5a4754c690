//! Shared utilities for tabmod crates.
//!
//! This crate provides text-to-cell inference used by ingestion and the
//! bridge between [`tabmod_model::Table`] and Polars `DataFrame`s.

pub mod polars;
pub mod values;

pub use self::polars::{FrameError, any_to_cell, dataframe_to_table, table_to_dataframe};
pub use self::values::{infer_cell, parse_bool, parse_f64};

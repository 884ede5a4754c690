//! Loading and saving tables and modifier records.
//!
//! Tables are read from CSV (with per-cell type inference) or from the
//! native JSON form; the format is picked from the file extension.

pub mod csv_table;
pub mod error;
pub mod json;

use std::path::Path;

pub use csv_table::{read_csv_from, read_csv_table, write_csv_table, write_csv_to};
pub use error::{IngestError, Result};
pub use json::{read_json_table, read_modifier_record, write_json_table, write_json_to};

use tabmod_model::Table;

/// On-disk table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// Format implied by the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// Read a table, choosing the reader from the extension.
pub fn read_table(path: &Path) -> Result<Table> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => read_csv_table(path),
        Some(TableFormat::Json) => read_json_table(path),
        None => Err(IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Write a table in `format`.
pub fn write_table(table: &Table, path: &Path, format: TableFormat) -> Result<()> {
    match format {
        TableFormat::Csv => write_csv_table(table, path),
        TableFormat::Json => write_json_table(table, path),
    }
}

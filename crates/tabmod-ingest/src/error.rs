//! Error types for table and record loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing tables and records.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// The CSV reader or writer rejected the data.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Two header cells normalize to the same column name.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateHeader { column: String, path: PathBuf },

    /// A nested table cannot be written as CSV text.
    #[error("column '{column}' holds nested tables and cannot be written to {path}")]
    NestedTable { column: String, path: PathBuf },

    // === JSON Errors ===
    /// A native table document did not parse.
    #[error("invalid table JSON in {path}: {source}")]
    TableJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// NaN and infinities have no JSON form; serde_json would write `null`.
    #[error("column '{column}' row {row} holds a non-finite number and cannot be written to {path}")]
    NonFiniteCell {
        column: String,
        row: usize,
        path: PathBuf,
    },

    /// A modifier record did not parse.
    #[error("invalid modifier record in {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: tabmod_transform::ModifierError,
    },

    /// The file extension names no supported table format.
    #[error("unsupported table format for {path}: expected .csv or .json")]
    UnsupportedFormat { path: PathBuf },
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;

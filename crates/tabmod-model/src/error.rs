use thiserror::Error;

/// Errors raised when a table is built from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
    #[error("column {name} has {actual} cells, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;

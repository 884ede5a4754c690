//! Error types for modifier construction and serialization.

use thiserror::Error;

use crate::modifier::ModifierKind;

/// Errors raised while building, serializing or running modifiers.
///
/// Configuration problems that the pipeline tolerates (missing sort column,
/// empty range list, unknown record kind) are not errors; they are no-ops.
#[derive(Debug, Error)]
pub enum ModifierError {
    /// A record was handed to the constructor of a different kind.
    #[error("record of kind {found} cannot build a {expected} modifier")]
    KindMismatch {
        expected: ModifierKind,
        found: String,
    },

    /// The options object of a known kind does not match its schema.
    #[error("invalid options for {kind}: {source}")]
    InvalidOptions {
        kind: ModifierKind,
        #[source]
        source: serde_json::Error,
    },

    /// Options could not be turned into JSON.
    #[error("failed to serialize options for {kind}: {source}")]
    SerializeOptions {
        kind: ModifierKind,
        #[source]
        source: serde_json::Error,
    },

    /// An option holds NaN or an infinity. JSON cannot carry either, so the
    /// modifier could not be rebuilt from its own record.
    #[error("{kind} option {field} holds a non-finite number")]
    NonFiniteOption { kind: ModifierKind, field: String },

    /// The record was written by a newer revision of the record format.
    #[error("record version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The input is not a modifier record at all.
    #[error("failed to parse modifier record: {0}")]
    Parse(#[from] serde_json::Error),

    /// A table holds the `columnNames` sentinel but is not in inverted form.
    #[error("column `columnNames` is not an inversion header: {reason}")]
    InvertCollision { reason: String },
}

pub type Result<T> = std::result::Result<T, ModifierError>;

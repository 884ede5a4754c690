//! Serialized form of a modifier: `{kind, version, options}`, plus
//! `modifiers` for chains.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModifierError, Result};
use crate::modifier::ModifierKind;

/// Revision of the record format written by this build. Records without a
/// `version` field are read as revision 1.
pub const RECORD_VERSION: u32 = 1;

fn current_version() -> u32 {
    RECORD_VERSION
}

/// A named, versioned modifier record.
///
/// `kind` stays a plain string so that records naming kinds this build does
/// not know still parse; the registry decides what to do with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierRecord {
    pub kind: String,
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub options: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<Vec<ModifierRecord>>,
}

impl ModifierRecord {
    pub fn new(kind: ModifierKind, options: Value) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            version: RECORD_VERSION,
            options,
            modifiers: None,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<ModifierRecord>) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Parse a record from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON text for this record.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The known kind this record names, if any.
    pub fn known_kind(&self) -> Option<ModifierKind> {
        self.kind.parse().ok()
    }

    /// Check that this record names `expected`.
    pub(crate) fn expect_kind(&self, expected: ModifierKind) -> Result<()> {
        if self.kind == expected.as_str() {
            Ok(())
        } else {
            Err(ModifierError::KindMismatch {
                expected,
                found: self.kind.clone(),
            })
        }
    }

    /// Decode the options for `kind`, merging missing fields with defaults.
    /// Absent (`null`) options mean all defaults. Records from a newer
    /// format revision are refused.
    pub(crate) fn decode_options<T>(&self, kind: ModifierKind) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.expect_kind(kind)?;
        if self.version > RECORD_VERSION {
            return Err(ModifierError::UnsupportedVersion {
                found: self.version,
                supported: RECORD_VERSION,
            });
        }
        if self.options.is_null() {
            return Ok(T::default());
        }
        T::deserialize(&self.options).map_err(|source| ModifierError::InvalidOptions { kind, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_still_parse() {
        let record = ModifierRecord::from_json(r#"{"kind":"Median","options":{}}"#).unwrap();
        assert_eq!(record.kind, "Median");
        assert_eq!(record.known_kind(), None);
    }

    #[test]
    fn missing_options_default_to_null() {
        let record = ModifierRecord::from_json(r#"{"kind":"Invert"}"#).unwrap();
        assert!(record.options.is_null());
        assert!(record.modifiers.is_none());
    }

    #[test]
    fn records_carry_the_format_version() {
        let record = ModifierRecord::new(ModifierKind::Invert, Value::Null);
        let json: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], RECORD_VERSION);

        let legacy = ModifierRecord::from_json(r#"{"kind":"Invert","options":{}}"#).unwrap();
        assert_eq!(legacy.version, 1);
    }

    #[test]
    fn newer_versions_are_refused() {
        let record =
            ModifierRecord::from_json(r#"{"kind":"Sort","version":2,"options":{}}"#).unwrap();
        let err = record
            .decode_options::<serde_json::Map<String, Value>>(ModifierKind::Sort)
            .unwrap_err();
        assert!(matches!(
            err,
            ModifierError::UnsupportedVersion {
                found: 2,
                supported: RECORD_VERSION
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ModifierRecord::from_json("{kind: Sort").unwrap_err();
        assert!(matches!(err, ModifierError::Parse(_)));
    }
}

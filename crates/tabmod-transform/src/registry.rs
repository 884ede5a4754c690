//! Factory table mapping modifier kinds to constructors.
//!
//! The registry is passed explicitly to whatever deserializes records; there
//! is no process-wide registration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::chain::ChainModifier;
use crate::error::Result;
use crate::group::GroupModifier;
use crate::invert::InvertModifier;
use crate::modifier::{Modifier, ModifierKind};
use crate::range::RangeModifier;
use crate::record::ModifierRecord;
use crate::series_points::SeriesPointsModifier;
use crate::sort::SortModifier;

/// Builds one modifier from its record. The registry is handed through so
/// that composite kinds can build their children.
pub type ModifierFactory = fn(&ModifierRecord, &ModifierRegistry) -> Result<Arc<dyn Modifier>>;

#[derive(Debug, Clone, Default)]
pub struct ModifierRegistry {
    factories: HashMap<ModifierKind, ModifierFactory>,
}

impl ModifierRegistry {
    /// An empty registry. Every record is unknown to it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ModifierKind::Chain, |record, registry| {
            Ok(Arc::new(ChainModifier::from_record(record, registry)?))
        });
        registry.register(ModifierKind::Sort, |record, _| {
            Ok(Arc::new(SortModifier::from_record(record)?))
        });
        registry.register(ModifierKind::Range, |record, _| {
            Ok(Arc::new(RangeModifier::from_record(record)?))
        });
        registry.register(ModifierKind::Group, |record, _| {
            Ok(Arc::new(GroupModifier::from_record(record)?))
        });
        registry.register(ModifierKind::Invert, |record, _| {
            Ok(Arc::new(InvertModifier::from_record(record)?))
        });
        registry.register(ModifierKind::SeriesPoints, |record, _| {
            Ok(Arc::new(SeriesPointsModifier::from_record(record)?))
        });
        registry
    }

    /// Register or replace the factory for `kind`.
    pub fn register(&mut self, kind: ModifierKind, factory: ModifierFactory) -> &mut Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Registered kinds in declaration order.
    pub fn kinds(&self) -> Vec<ModifierKind> {
        ModifierKind::ALL
            .into_iter()
            .filter(|kind| self.factories.contains_key(kind))
            .collect()
    }

    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Build a modifier from `record`.
    ///
    /// Returns `Ok(None)` when the discriminator is unknown or not
    /// registered; the record is dropped with a warning. Malformed options of
    /// a registered kind are an error.
    pub fn build(&self, record: &ModifierRecord) -> Result<Option<Arc<dyn Modifier>>> {
        let factory = record
            .known_kind()
            .and_then(|kind| self.factories.get(&kind));
        match factory {
            Some(factory) => factory(record, self).map(Some),
            None => {
                warn!(kind = %record.kind, "dropping modifier of unregistered kind");
                Ok(None)
            }
        }
    }

    /// Parse a record from JSON text and build it.
    pub fn from_json(&self, json: &str) -> Result<Option<Arc<dyn Modifier>>> {
        self.build(&ModifierRecord::from_json(json)?)
    }
}

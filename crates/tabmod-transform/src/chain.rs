//! Sequential composition of modifiers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::Table;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::event::{EventEmitter, EventKind, ModifierEvent};
use crate::modifier::{EXECUTE, Modifier, ModifierKind, options_to_json, run_with_events};
use crate::record::ModifierRecord;
use crate::registry::ModifierRegistry;

/// Options for [`ChainModifier`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainOptions {
    /// Apply children last to first.
    pub reverse: bool,
}

/// An ordered sequence of modifiers applied one after another.
///
/// Children are shared handles; the same modifier may appear more than once.
/// The stored order only changes through [`add`](Self::add),
/// [`remove`](Self::remove) and [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct ChainModifier {
    options: ChainOptions,
    modifiers: Vec<Arc<dyn Modifier>>,
    events: EventEmitter,
}

impl ChainModifier {
    pub fn new(options: ChainOptions, modifiers: Vec<Arc<dyn Modifier>>) -> Self {
        Self {
            options,
            modifiers,
            events: EventEmitter::new(),
        }
    }

    /// Build a chain and its children. Children of unknown kind are dropped.
    pub fn from_record(record: &ModifierRecord, registry: &ModifierRegistry) -> Result<Self> {
        let options = record.decode_options(ModifierKind::Chain)?;
        let mut chain = Self::new(options, Vec::new());
        chain.extend_from_records(record.modifiers.as_deref().unwrap_or_default(), registry)?;
        Ok(chain)
    }

    /// Append the children of a serialized chain document.
    ///
    /// A document that does not parse emits `parseError` and returns the
    /// error; the chain is left as it was.
    pub fn load_json(&mut self, json: &str, registry: &ModifierRegistry) -> Result<()> {
        let record = match ModifierRecord::from_json(json) {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "chain document did not parse");
                self.events
                    .emit(&ModifierEvent::new(EventKind::ParseError).with_error(&error));
                return Err(error);
            }
        };
        record.expect_kind(ModifierKind::Chain)?;
        self.extend_from_records(record.modifiers.as_deref().unwrap_or_default(), registry)
    }

    fn extend_from_records(
        &mut self,
        records: &[ModifierRecord],
        registry: &ModifierRegistry,
    ) -> Result<()> {
        for child in records {
            if let Some(modifier) = registry.build(child)? {
                self.add(modifier);
            }
        }
        Ok(())
    }

    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    /// Children in stored order.
    pub fn modifiers(&self) -> &[Arc<dyn Modifier>] {
        &self.modifiers
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn add(&mut self, modifier: Arc<dyn Modifier>) {
        self.emit_composition(EventKind::AddModifier, modifier.as_ref());
        self.modifiers.push(Arc::clone(&modifier));
        self.emit_composition(EventKind::AfterAddModifier, modifier.as_ref());
    }

    /// Remove the first occurrence of `modifier` (by identity). Returns
    /// whether anything was removed; events fire only if it was.
    pub fn remove(&mut self, modifier: &Arc<dyn Modifier>) -> bool {
        let Some(index) = self
            .modifiers
            .iter()
            .position(|held| std::ptr::addr_eq(Arc::as_ptr(held), Arc::as_ptr(modifier)))
        else {
            return false;
        };
        self.emit_composition(EventKind::RemoveModifier, modifier.as_ref());
        self.modifiers.remove(index);
        self.emit_composition(EventKind::AfterRemoveModifier, modifier.as_ref());
        true
    }

    pub fn clear(&mut self) {
        self.events.emit(&ModifierEvent::new(EventKind::ClearChain));
        self.modifiers.clear();
        self.events
            .emit(&ModifierEvent::new(EventKind::AfterClearChain));
    }

    /// The order children run in for the next `modify`, as a fresh sequence.
    pub fn execution_order(&self) -> Vec<Arc<dyn Modifier>> {
        let mut order = self.modifiers.clone();
        if self.options.reverse {
            order.reverse();
        }
        order
    }

    fn emit_composition(&self, kind: EventKind, modifier: &dyn Modifier) {
        self.events
            .emit(&ModifierEvent::new(kind).with_modifier(modifier));
    }

    fn apply(&self, table: &mut Table, detail: Option<&Value>) {
        let order = self.execution_order();
        debug!(
            steps = order.len(),
            reverse = self.options.reverse,
            "executing chain"
        );
        for (step, modifier) in order.iter().enumerate() {
            trace!(step, kind = %modifier.kind(), "chain step");
            self.events.emit(
                &ModifierEvent::new(EventKind::ExecuteModifier)
                    .with_detail(detail)
                    .with_table(table)
                    .with_modifier(modifier.as_ref()),
            );
            modifier.modify(table, detail);
            self.events.emit(
                &ModifierEvent::new(EventKind::AfterExecuteModifier)
                    .with_detail(detail)
                    .with_table(table)
                    .with_modifier(modifier.as_ref()),
            );
        }
    }
}

impl Modifier for ChainModifier {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Chain
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn options_json(&self) -> Result<Value> {
        options_to_json(ModifierKind::Chain, &self.options)
    }

    fn modify<'t>(&self, table: &'t mut Table, detail: Option<&Value>) -> &'t mut Table {
        run_with_events(&self.events, EXECUTE, table, detail, |table| {
            self.apply(table, detail);
        })
    }

    fn children(&self) -> &[Arc<dyn Modifier>] {
        &self.modifiers
    }

    fn to_record(&self) -> Result<ModifierRecord> {
        let children = self
            .modifiers
            .iter()
            .map(|modifier| modifier.to_record())
            .collect::<Result<Vec<_>>>()?;
        Ok(ModifierRecord::new(self.kind(), self.options_json()?).with_modifiers(children))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tabmod_model::Cell;

    use super::*;
    use crate::error::ModifierError;
    use crate::invert::InvertModifier;
    use crate::sort::{SortDirection, SortModifier, SortOptions};

    fn asc() -> Arc<dyn Modifier> {
        Arc::new(SortModifier::new(
            SortOptions::default().with_direction(SortDirection::Asc),
        ))
    }

    fn kinds(chain: &ChainModifier) -> Vec<ModifierKind> {
        chain.modifiers().iter().map(|m| m.kind()).collect()
    }

    #[test]
    fn reverse_does_not_touch_stored_order() {
        let chain = ChainModifier::new(
            ChainOptions { reverse: true },
            vec![asc(), Arc::new(InvertModifier::new())],
        );
        let mut table = Table::from_columns([("y", vec![Cell::from(2), Cell::from(1)])]);
        for _ in 0..3 {
            chain.modify(&mut table, None);
            assert_eq!(kinds(&chain), [ModifierKind::Sort, ModifierKind::Invert]);
        }
        let order: Vec<_> = chain.execution_order().iter().map(|m| m.kind()).collect();
        assert_eq!(order, [ModifierKind::Invert, ModifierKind::Sort]);
    }

    #[test]
    fn remove_takes_first_matching_reference_only() {
        let sort = asc();
        let other = asc();
        let mut chain = ChainModifier::default();
        chain.add(Arc::clone(&sort));
        chain.add(Arc::clone(&other));
        chain.add(Arc::clone(&sort));

        assert!(chain.remove(&sort));
        assert_eq!(chain.len(), 2);
        assert!(Arc::ptr_eq(&chain.modifiers()[0], &other));
        assert!(Arc::ptr_eq(&chain.modifiers()[1], &sort));

        let stranger = asc();
        assert!(!chain.remove(&stranger));
    }

    #[test]
    fn composition_events_wrap_each_mutation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ChainModifier::default();
        let sink = Arc::clone(&seen);
        chain.events().on(move |event| {
            sink.lock().unwrap().push(event.kind);
        });

        let sort = asc();
        chain.add(Arc::clone(&sort));
        chain.remove(&sort);
        chain.clear();

        assert_eq!(
            *seen.lock().unwrap(),
            [
                EventKind::AddModifier,
                EventKind::AfterAddModifier,
                EventKind::RemoveModifier,
                EventKind::AfterRemoveModifier,
                EventKind::ClearChain,
                EventKind::AfterClearChain,
            ]
        );
    }

    #[test]
    fn modify_events_wrap_each_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = ChainModifier::new(ChainOptions::default(), vec![asc(), asc()]);
        let sink = Arc::clone(&seen);
        chain.events().on(move |event| {
            let kind = event.modifier.map(|m| m.kind());
            sink.lock().unwrap().push((event.kind, kind));
        });

        chain.modify(&mut Table::new(), None);

        let step = Some(ModifierKind::Sort);
        assert_eq!(
            *seen.lock().unwrap(),
            [
                (EventKind::Execute, None),
                (EventKind::ExecuteModifier, step),
                (EventKind::AfterExecuteModifier, step),
                (EventKind::ExecuteModifier, step),
                (EventKind::AfterExecuteModifier, step),
                (EventKind::AfterExecute, None),
            ]
        );
    }

    #[test]
    fn unknown_children_are_dropped_on_load() {
        let json = r#"{
            "kind": "Chain",
            "options": {"reverse": false},
            "modifiers": [
                {"kind": "Sort", "options": {"direction": "asc"}},
                {"kind": "Median", "options": {}},
                {"kind": "Invert", "options": {}}
            ]
        }"#;
        let record = ModifierRecord::from_json(json).unwrap();
        let chain = ChainModifier::from_record(&record, &ModifierRegistry::builtin()).unwrap();
        assert_eq!(kinds(&chain), [ModifierKind::Sort, ModifierKind::Invert]);
    }

    #[test]
    fn malformed_document_emits_parse_error() {
        let mut chain = ChainModifier::default();
        let parse_errors = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&parse_errors);
        chain.events().on(move |event| {
            if event.kind == EventKind::ParseError && event.error.is_some() {
                *sink.lock().unwrap() += 1;
            }
        });

        let err = chain
            .load_json("{\"kind\": \"Chain\", ", &ModifierRegistry::builtin())
            .unwrap_err();

        assert!(matches!(err, ModifierError::Parse(_)));
        assert_eq!(*parse_errors.lock().unwrap(), 1);
        assert!(chain.is_empty());
    }

    #[test]
    fn record_nests_children_in_order() {
        let chain = ChainModifier::new(
            ChainOptions::default(),
            vec![Arc::new(InvertModifier::new()), asc()],
        );
        let record = chain.to_record().unwrap();
        let children: Vec<_> = record
            .modifiers
            .unwrap()
            .into_iter()
            .map(|child| child.kind)
            .collect();
        assert_eq!(children, ["Invert", "Sort"]);
    }
}

//! Synchronous event notification around modifier execution.
//!
//! Every modifier owns an [`EventEmitter`]. Listeners run inline, in
//! registration order, while the emitting call is still on the stack. They
//! receive shared borrows of the table, so a listener can observe an
//! intermediate state but cannot mutate the table mid-dispatch.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabmod_model::Table;

use crate::error::ModifierError;
use crate::modifier::Modifier;

/// Event type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Execute,
    AfterExecute,
    Modify,
    AfterModify,
    AddModifier,
    AfterAddModifier,
    RemoveModifier,
    AfterRemoveModifier,
    ClearChain,
    AfterClearChain,
    ExecuteModifier,
    AfterExecuteModifier,
    Error,
    ParseError,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::AfterExecute => "afterExecute",
            Self::Modify => "modify",
            Self::AfterModify => "afterModify",
            Self::AddModifier => "addModifier",
            Self::AfterAddModifier => "afterAddModifier",
            Self::RemoveModifier => "removeModifier",
            Self::AfterRemoveModifier => "afterRemoveModifier",
            Self::ClearChain => "clearChain",
            Self::AfterClearChain => "afterClearChain",
            Self::ExecuteModifier => "executeModifier",
            Self::AfterExecuteModifier => "afterExecuteModifier",
            Self::Error => "error",
            Self::ParseError => "parseError",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification: `{type, detail?, table?, modifier?, error?}`.
#[derive(Debug, Clone, Copy)]
pub struct ModifierEvent<'a> {
    pub kind: EventKind,
    pub detail: Option<&'a Value>,
    pub table: Option<&'a Table>,
    /// The child modifier, for chain composition and step events.
    pub modifier: Option<&'a dyn Modifier>,
    pub error: Option<&'a ModifierError>,
}

impl<'a> ModifierEvent<'a> {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            detail: None,
            table: None,
            modifier: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Option<&'a Value>) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: &'a Table) -> Self {
        self.table = Some(table);
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: &'a dyn Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: &'a ModifierError) -> Self {
        self.error = Some(error);
        self
    }
}

type Listener = Arc<dyn Fn(&ModifierEvent<'_>) + Send + Sync>;

#[derive(Default)]
struct ListenerList {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Listener registry owned by a modifier.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<ListenerList>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the returned handle keeps the listener;
    /// call [`Subscription::unsubscribe`] to remove it.
    pub fn on<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ModifierEvent<'_>) + Send + Sync + 'static,
    {
        let mut list = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push((id, Arc::new(listener)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Dispatch `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &ModifierEvent<'_>) {
        // Snapshot so listeners may subscribe or unsubscribe while running.
        let snapshot: Vec<Listener> = {
            let list = self
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            list.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle returned by [`EventEmitter::on`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<ListenerList>>,
}

impl Subscription {
    /// Remove the listener. A no-op once the emitter is gone.
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

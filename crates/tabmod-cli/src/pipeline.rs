//! Run one modifier record over one table and collect what happened.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result, anyhow};
use tabmod_model::Table;
use tabmod_transform::{
    EventKind, Modifier, ModifierKind, ModifierRecord, ModifierRegistry, Subscription,
};
use tracing::{info, info_span, warn};

use crate::types::{PipelineResult, StepSummary};

/// Build `record` with `registry` and apply it to `table`.
///
/// The top-level record must name a registered kind. Children of unknown or
/// unregistered kinds are skipped and listed in [`PipelineResult::dropped`].
pub fn run_pipeline(
    record: &ModifierRecord,
    registry: &ModifierRegistry,
    mut table: Table,
) -> Result<PipelineResult> {
    let kind = record
        .known_kind()
        .filter(|kind| registry.contains(*kind))
        .ok_or_else(|| anyhow!("pipeline kind `{}` is not registered", record.kind))?;
    let span = info_span!("pipeline", kind = %kind);
    let _guard = span.enter();

    let modifier = registry
        .build(record)
        .with_context(|| format!("build {kind} pipeline"))?
        .ok_or_else(|| anyhow!("pipeline kind `{kind}` is not registered"))?;

    let mut dropped = Vec::new();
    collect_dropped(record, registry, &mut dropped);
    for name in &dropped {
        warn!(kind = %name, "skipped modifier of unregistered kind");
    }

    let steps = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let mut subscriptions = vec![watch_steps(modifier.as_ref(), &steps)];
    watch_errors(modifier.as_ref(), &errors, &mut subscriptions);

    let rows_in = table.row_count();
    modifier.modify(&mut table, None);
    for subscription in subscriptions {
        subscription.unsubscribe();
    }

    let steps = std::mem::take(&mut *steps.lock().unwrap_or_else(PoisonError::into_inner));
    let errors = std::mem::take(&mut *errors.lock().unwrap_or_else(PoisonError::into_inner));
    info!(
        rows_in,
        rows_out = table.row_count(),
        columns_out = table.column_count(),
        steps = steps.len(),
        errors = errors.len(),
        "pipeline finished"
    );

    Ok(PipelineResult {
        pipeline_kind: kind,
        table,
        rows_in,
        steps,
        errors,
        dropped,
    })
}

/// The event pair that brackets one step of `kind`.
fn step_events(kind: ModifierKind) -> (EventKind, EventKind) {
    match kind {
        ModifierKind::Chain => (EventKind::ExecuteModifier, EventKind::AfterExecuteModifier),
        ModifierKind::Sort => (EventKind::Execute, EventKind::AfterExecute),
        _ => (EventKind::Modify, EventKind::AfterModify),
    }
}

/// Record row counts around each step: every child of a chain, or the
/// single leaf otherwise.
fn watch_steps(modifier: &dyn Modifier, steps: &Arc<Mutex<Vec<StepSummary>>>) -> Subscription {
    let root_kind = modifier.kind();
    let (before, after) = step_events(root_kind);
    let sink = Arc::clone(steps);
    modifier.events().on(move |event| {
        let Some(table) = event.table else {
            return;
        };
        let mut steps = sink.lock().unwrap_or_else(PoisonError::into_inner);
        if event.kind == before {
            steps.push(StepSummary {
                kind: event.modifier.map_or(root_kind, |m| m.kind()),
                rows_before: table.row_count(),
                rows_after: table.row_count(),
                columns_after: table.column_count(),
            });
        } else if event.kind == after
            && let Some(step) = steps.last_mut()
        {
            step.rows_after = table.row_count();
            step.columns_after = table.column_count();
        }
    })
}

/// Collect `error` events from `modifier` and everything nested in it.
fn watch_errors(
    modifier: &dyn Modifier,
    errors: &Arc<Mutex<Vec<String>>>,
    subscriptions: &mut Vec<Subscription>,
) {
    let sink = Arc::clone(errors);
    let kind = modifier.kind();
    subscriptions.push(modifier.events().on(move |event| {
        if event.kind != EventKind::Error {
            return;
        }
        let message = event
            .error
            .map_or_else(|| "unspecified error".to_string(), ToString::to_string);
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{kind}: {message}"));
    }));
    for child in modifier.children() {
        watch_errors(child.as_ref(), errors, subscriptions);
    }
}

fn collect_dropped(record: &ModifierRecord, registry: &ModifierRegistry, dropped: &mut Vec<String>) {
    for child in record.modifiers.as_deref().unwrap_or_default() {
        match child.known_kind() {
            Some(kind) if registry.contains(kind) => {
                collect_dropped(child, registry, dropped);
            }
            _ => dropped.push(child.kind.clone()),
        }
    }
}

use tabmod_model::Table;
use tabmod_transform::ModifierKind;

/// Outcome of running one pipeline over one table.
#[derive(Debug)]
pub struct PipelineResult {
    pub pipeline_kind: ModifierKind,
    pub table: Table,
    pub rows_in: usize,
    pub steps: Vec<StepSummary>,
    /// Messages from `error` events raised while running.
    pub errors: Vec<String>,
    /// Child records of unregistered kinds that were skipped.
    pub dropped: Vec<String>,
}

/// Row and column counts around one executed modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    pub kind: ModifierKind,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
}

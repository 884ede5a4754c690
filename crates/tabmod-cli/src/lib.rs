//! CLI library components for the tabmod pipeline runner.

pub mod logging;
pub mod pipeline;
pub mod types;

pub use pipeline::run_pipeline;
pub use types::{PipelineResult, StepSummary};

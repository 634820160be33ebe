//! Ordered, incremental execution of pipeline steps.
//!
//! A pipeline is the configured list of steps. The [`scheduler`] picks the
//! part of it a run should cover, and the [`PipelineStepsExecutor`] runs that
//! part in order against a shared [`ExecutionContext`], skipping steps whose
//! declared outputs are newer than their declared inputs.
//!
//! [`ExecutionContext`]: crate::domain::ExecutionContext

mod dirty;
mod error;
mod executor;
pub mod scheduler;
mod step;
pub mod steps;

pub use dirty::{DirtyReason, dirty_reason};
pub use error::PipelineError;
pub use executor::{PipelineStepsExecutor, PipelineSummary};
pub use scheduler::{Named, select_steps};
pub use step::{PipelineStep, StepStatus};

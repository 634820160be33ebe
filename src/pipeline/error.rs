//! Errors raised while executing pipeline steps.

// miette's derive expands to assignments some compiler versions flag as
// unused, and `#[expect]` fails on versions where the lint stays quiet.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use thiserror::Error;

/// A step stopped the pipeline. Remaining steps are not run and nothing
/// already done is rolled back.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    /// The step ran and reported a nonzero status.
    #[error("Step '{step}' failed with exit code {code}.")]
    #[diagnostic(code(komposit::pipeline::step_failed))]
    StepFailed {
        /// Failing step.
        step: String,
        /// Status reported by the step.
        code: i32,
    },
    /// The step could not be carried out at all.
    #[error("Step '{step}' could not be executed.")]
    #[diagnostic(code(komposit::pipeline::step_errored))]
    StepErrored {
        /// Failing step.
        step: String,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Name of the step that stopped the pipeline.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::StepFailed { step, .. } | Self::StepErrored { step, .. } => step,
        }
    }

    /// Process exit code matching the failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::StepFailed { code, .. } => *code,
            Self::StepErrored { .. } => 1,
        }
    }
}

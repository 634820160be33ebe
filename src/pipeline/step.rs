//! The contract every pipeline step implements.

use crate::domain::ExecutionContext;
use anyhow::Result;
use camino::Utf8PathBuf;

/// Exit status reported by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus(i32);

impl StepStatus {
    /// The step succeeded.
    pub const SUCCESS: Self = Self(0);

    /// Wrap a raw exit code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Raw exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether the code signals success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// One unit of work in a pipeline.
///
/// Inputs and outputs are evaluated against the context as it stands when
/// the step is reached, so they can depend on what earlier steps recorded.
pub trait PipelineStep {
    /// Name used for scheduling and reporting.
    fn name(&self) -> &str;

    /// Files whose modification invalidates the step's outputs.
    fn inputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf>;

    /// Files the step produces.
    fn outputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf>;

    /// Steps returning `true` bypass the up-to-date check.
    fn always_run(&self) -> bool {
        false
    }

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step cannot be carried out. A step that runs
    /// but fails reports a nonzero [`StepStatus`] instead.
    fn run(&mut self, context: &ExecutionContext) -> Result<StepStatus>;

    /// Record facts for later steps. Called after the step ran or was
    /// skipped as up to date.
    fn update_execution_context(&self, _context: &mut ExecutionContext) {}
}

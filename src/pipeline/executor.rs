//! Sequential pipeline execution.

use super::{PipelineError, PipelineStep, dirty_reason};
use crate::domain::ExecutionContext;
use crate::status::{StepReporter, StepState};
use tracing::{debug, warn};

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Steps that were executed, in order.
    pub executed: Vec<String>,
    /// Steps skipped as up to date, in order.
    pub skipped: Vec<String>,
}

/// Runs scheduled steps one after the other.
pub struct PipelineStepsExecutor<'r> {
    reporter: &'r dyn StepReporter,
    force_run: bool,
}

impl<'r> PipelineStepsExecutor<'r> {
    /// Create an executor. With `force_run` every step runs regardless of
    /// its files.
    #[must_use]
    pub const fn new(reporter: &'r dyn StepReporter, force_run: bool) -> Self {
        Self {
            reporter,
            force_run,
        }
    }

    /// Run `steps` in order against `context`.
    ///
    /// The first failing step stops the run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StepFailed`] when a step reports a nonzero
    /// status and [`PipelineError::StepErrored`] when it cannot run at all.
    pub fn run(
        &self,
        steps: &mut [Box<dyn PipelineStep>],
        context: &mut ExecutionContext,
    ) -> Result<PipelineSummary, PipelineError> {
        let total = steps.len();
        let mut summary = PipelineSummary::default();
        for (idx, step) in steps.iter_mut().enumerate() {
            let current = idx + 1;
            let name = step.name().to_owned();
            if !self.needs_run(step.as_ref(), context) {
                self.reporter
                    .report_step(current, total, &name, StepState::Skipped);
                step.update_execution_context(context);
                summary.skipped.push(name);
                continue;
            }

            self.reporter
                .report_step(current, total, &name, StepState::Running);
            let status = match step.run(context) {
                Ok(status) => status,
                Err(source) => {
                    self.reporter
                        .report_step(current, total, &name, StepState::Failed);
                    return Err(PipelineError::StepErrored { step: name, source });
                }
            };
            if !status.is_success() {
                self.reporter
                    .report_step(current, total, &name, StepState::Failed);
                return Err(PipelineError::StepFailed {
                    step: name,
                    code: status.code(),
                });
            }
            self.reporter
                .report_step(current, total, &name, StepState::Done);
            step.update_execution_context(context);
            summary.executed.push(name);
        }
        self.reporter
            .report_complete(summary.executed.len(), summary.skipped.len());
        Ok(summary)
    }

    fn needs_run(&self, step: &dyn PipelineStep, context: &ExecutionContext) -> bool {
        if self.force_run || step.always_run() {
            return true;
        }
        match dirty_reason(&step.inputs(context), &step.outputs(context)) {
            Ok(Some(reason)) => {
                debug!(step = step.name(), %reason, "step is dirty");
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(step = step.name(), error = %err, "cannot check step files; running it");
                true
            }
        }
    }
}

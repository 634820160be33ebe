//! Selection of the pipeline steps a run covers.

use super::PipelineStep;
use crate::config::StepConfig;
use crate::error::KompositError;

/// Anything the scheduler can select by name.
pub trait Named {
    /// Step name.
    fn name(&self) -> &str;
}

impl Named for StepConfig {
    fn name(&self) -> &str {
        &self.step
    }
}

impl Named for Box<dyn PipelineStep> {
    fn name(&self) -> &str {
        PipelineStep::name(self.as_ref())
    }
}

/// Select the steps to execute.
///
/// Without a step name the whole pipeline runs. With a name, the pipeline
/// runs up to and including that step, or only that step when `single` is
/// set. An empty result is a valid "nothing to do".
///
/// ```rust
/// use komposit::config::{StepConfig, StepKind};
/// use komposit::pipeline::select_steps;
///
/// let step = |name: &str| StepConfig {
///     step: name.into(),
///     kind: StepKind::Generate,
///     run: Vec::new(),
///     inputs: Vec::new(),
///     outputs: Vec::new(),
/// };
/// let pipeline = [step("A"), step("B"), step("C")];
/// let selected = select_steps(&pipeline, Some("B"), false).expect("known step");
/// assert_eq!(selected.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`KompositError::StepNotFound`] if `step` names no step.
pub fn select_steps<'a, T: Named>(
    steps: &'a [T],
    step: Option<&str>,
    single: bool,
) -> Result<&'a [T], KompositError> {
    let Some(name) = step else {
        return Ok(steps);
    };
    let position = steps
        .iter()
        .position(|s| s.name() == name)
        .ok_or_else(|| KompositError::StepNotFound {
            step: name.to_owned(),
        })?;
    let selected = if single {
        steps.get(position..=position)
    } else {
        steps.get(..=position)
    };
    Ok(selected.unwrap_or_default())
}

//! Concrete pipeline steps and their construction from configuration.

mod build;
mod command;
mod generate;

pub use build::ExecuteBuild;
pub use command::RunCommand;
pub use generate::GenerateBuildFiles;

use super::PipelineStep;
use crate::config::{StepConfig, StepKind};
use crate::error::KompositError;

/// Turn one configured step into a runnable step.
///
/// # Errors
///
/// Returns [`KompositError::InvalidStep`] for a `command` step without a
/// program to run.
pub fn create_step(config: &StepConfig) -> Result<Box<dyn PipelineStep>, KompositError> {
    let step: Box<dyn PipelineStep> = match config.kind {
        StepKind::Generate => Box::new(GenerateBuildFiles::new(&config.step)),
        StepKind::Build => Box::new(ExecuteBuild::new(&config.step)),
        StepKind::Command => Box::new(RunCommand::from_config(config)?),
    };
    Ok(step)
}

/// Turn every configured step into a runnable step, keeping their order.
///
/// # Errors
///
/// Returns the first error reported by [`create_step`].
pub fn create_steps(configs: &[StepConfig]) -> Result<Vec<Box<dyn PipelineStep>>, KompositError> {
    configs.iter().map(create_step).collect()
}

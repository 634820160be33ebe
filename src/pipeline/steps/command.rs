use crate::config::StepConfig;
use crate::domain::ExecutionContext;
use crate::error::KompositError;
use crate::pipeline::{PipelineStep, StepStatus};
use crate::runner::process::ToolInvocation;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Runs a user supplied program in the project directory.
#[derive(Debug, Clone)]
pub struct RunCommand {
    name: String,
    program: Utf8PathBuf,
    args: Vec<String>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl RunCommand {
    /// Build the step from its configuration entry.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::InvalidStep`] when `run` is empty.
    pub fn from_config(config: &StepConfig) -> Result<Self, KompositError> {
        let Some((program, args)) = config.run.split_first() else {
            return Err(KompositError::InvalidStep {
                step: config.step.clone(),
                reason: "command steps need a non-empty 'run' list".to_owned(),
            });
        };
        Ok(Self {
            name: config.step.clone(),
            program: Utf8PathBuf::from(program),
            args: args.to_vec(),
            inputs: config.inputs.clone(),
            outputs: config.outputs.clone(),
        })
    }

    fn resolve(project_dir: &Utf8Path, paths: &[String]) -> Vec<Utf8PathBuf> {
        paths.iter().map(|path| project_dir.join(path)).collect()
    }
}

impl PipelineStep for RunCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        Self::resolve(&context.project_dir, &self.inputs)
    }

    fn outputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        Self::resolve(&context.project_dir, &self.outputs)
    }

    fn run(&mut self, context: &ExecutionContext) -> Result<StepStatus> {
        let invocation = ToolInvocation {
            program: &self.program,
            args: self.args.clone(),
            current_dir: &context.project_dir,
            install_dirs: &context.install_dirs,
        };
        let code = invocation
            .run()
            .with_context(|| format!("running {}", self.program))?;
        Ok(StepStatus::new(code))
    }
}

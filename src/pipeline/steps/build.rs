use crate::domain::ExecutionContext;
use crate::pipeline::{PipelineStep, StepStatus};
use crate::runner::process::{resolve_cmake_program, run_cmake};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;

/// Hands the generated project to `CMake`.
///
/// Always runs; the build tool tracks its own dependencies. Its exit code is
/// reported verbatim.
#[derive(Debug, Clone)]
pub struct ExecuteBuild {
    name: String,
}

impl ExecuteBuild {
    /// Create the step under the configured name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl PipelineStep for ExecuteBuild {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self, _context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        Vec::new()
    }

    fn outputs(&self, _context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        Vec::new()
    }

    fn always_run(&self) -> bool {
        true
    }

    fn run(&mut self, context: &ExecutionContext) -> Result<StepStatus> {
        let program = resolve_cmake_program();
        let target = context.target_name();
        let code = run_cmake(&program, &context.install_dirs, &context.output_dir, &target)
            .with_context(|| format!("running {program} for target {target}"))?;
        Ok(StepStatus::new(code))
    }
}

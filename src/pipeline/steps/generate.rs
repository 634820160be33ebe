use crate::cmake_gen::{self, generated_paths};
use crate::domain::ExecutionContext;
use crate::pipeline::{PipelineStep, StepStatus};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use tracing::debug;

/// Writes the build scripts of the selected variant.
///
/// Depends on the loaded configuration files and the variant configuration
/// file, so it is skipped while none of them changed.
#[derive(Debug, Clone)]
pub struct GenerateBuildFiles {
    name: String,
}

impl GenerateBuildFiles {
    /// Create the step under the configured name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

impl PipelineStep for GenerateBuildFiles {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        context
            .user_config_files
            .iter()
            .chain(context.variant_config_file.as_ref())
            .cloned()
            .collect()
    }

    fn outputs(&self, context: &ExecutionContext) -> Vec<Utf8PathBuf> {
        generated_paths(&context.output_dir)
    }

    fn run(&mut self, context: &ExecutionContext) -> Result<StepStatus> {
        debug!(output_dir = %context.output_dir, "generating build files");
        let files = cmake_gen::build_files(context).context("failed to generate build files")?;
        let mut written = 0;
        for file in &files {
            if file.write_if_changed()? {
                written += 1;
            }
        }
        if written == 0 {
            debug!(
                step = %self.name,
                "build files unchanged; their timestamps stay older than the touched inputs"
            );
        }
        Ok(StepStatus::SUCCESS)
    }

    fn update_execution_context(&self, context: &mut ExecutionContext) {
        context.generated_files = generated_paths(&context.output_dir);
    }
}

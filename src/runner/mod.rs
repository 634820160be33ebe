//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the project, resolves the requested variant and hands the scheduled
//! steps to the [`PipelineStepsExecutor`].

pub mod process;

use crate::cli::{Cli, Commands, RunArgs, RunConfig};
use crate::config::{ProjectConfig, load_project};
use crate::domain::{ExecutionContext, UserRequest, resolve_variant};
use crate::error::KompositError;
use crate::pipeline::{PipelineError, PipelineStepsExecutor, select_steps, steps::create_steps};
use crate::status::{IndicatifReporter, LogReporter, StepReporter};
use crate::traceability;
use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use std::env;
use tracing::{debug, info};

const RULE_WIDTH: usize = 80;

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or resolved, the
/// requested step or variant is unknown, or a pipeline step fails.
pub fn run(cli: &Cli) -> Result<()> {
    let args = match &cli.command {
        Some(Commands::Run(args)) => args.clone(),
        None => RunArgs::default(),
    };
    let config = RunConfig::from_args(&args)?;
    let project_dir = project_dir(cli)?;
    let project = load_project(&project_dir)
        .with_context(|| format!("failed to load project in {project_dir}"))?;
    if config.print {
        print_project_info(&project);
        return Ok(());
    }
    run_pipeline(&project, &config)
}

fn project_dir(cli: &Cli) -> Result<Utf8PathBuf> {
    let dir = match &cli.directory {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to determine the current directory")?,
    };
    let dir = dir
        .canonicalize()
        .with_context(|| format!("project directory {} is not accessible", dir.display()))?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|path| anyhow!("project directory {} is not valid UTF-8", path.display()))
}

/// Pick the variant to build: the requested one, or the only one defined.
fn select_variant(project: &ProjectConfig, requested: Option<&str>) -> Result<String, KompositError> {
    if let Some(name) = requested {
        return project.variant(name).map(|v| v.name.clone());
    }
    match project.variant_names().as_slice() {
        [only] => {
            info!("Selected the only variant '{only}'.");
            Ok((*only).to_owned())
        }
        names => Err(KompositError::NoVariantSelected {
            available: if names.is_empty() {
                "none".to_owned()
            } else {
                names.join(", ")
            },
        }),
    }
}

fn make_reporter(progress: bool) -> Box<dyn StepReporter> {
    if progress {
        Box::new(IndicatifReporter::new())
    } else {
        Box::new(LogReporter)
    }
}

fn run_pipeline(project: &ProjectConfig, config: &RunConfig) -> Result<()> {
    let variant_name = select_variant(project, config.variant.as_deref())?;
    let pipeline = project
        .pipeline
        .as_deref()
        .ok_or(KompositError::PipelineNotFound)?;
    let scheduled = select_steps(pipeline, config.step.as_deref(), config.single)?;
    if scheduled.is_empty() {
        info!("No steps to run.");
        return Ok(());
    }

    let variant = resolve_variant(project.variant(&variant_name)?, &project.pool, &project.project_dir)?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let json = serde_json::to_string_pretty(&variant)
            .context("failed to serialise the resolved variant")?;
        debug!("Resolved variant:\n{json}");
    }
    let user_request = match &config.component {
        Some(component) => {
            if variant.find(component).is_none() {
                return Err(KompositError::ComponentNotFound {
                    name: component.clone(),
                    variant: variant_name,
                }
                .into());
            }
            UserRequest::component(&variant_name, component, config.target.clone())
        }
        None => UserRequest::variant(&variant_name, config.target.clone()),
    };

    let mut context = ExecutionContext::new(&project.project_dir, variant, user_request);
    context.user_config_files = project.config_files();
    context.variant_config_file = project.variant_config_file(&variant_name)?;
    context.include_directories.clone_from(&project.include_directories);
    context.install_dirs.clone_from(&project.install_dirs);

    let mut steps = create_steps(scheduled)?;
    let reporter = make_reporter(config.progress);
    let summary = PipelineStepsExecutor::new(reporter.as_ref(), config.force_run)
        .run(&mut steps, &mut context)?;
    debug!(
        executed = ?summary.executed,
        skipped = ?summary.skipped,
        "pipeline summary"
    );
    Ok(())
}

fn print_project_info(project: &ProjectConfig) {
    let rule = "-".repeat(RULE_WIDTH);
    info!("{rule}");
    info!("Project directory: {}", project.project_dir);
    info!("Parsed {} configuration file(s).", project.user_configs.len());
    info!("Found {} component(s).", project.pool.len());
    info!("Found {} variant(s).", project.variants.len());
    if let Some(pipeline) = &project.pipeline {
        info!("Found pipeline config with {} step(s).", pipeline.len());
    } else {
        info!("No pipeline config found.");
    }
    let registry = traceability::core_registry();
    info!("Traceability ({} item(s)):", registry.len());
    for line in registry.to_string().lines() {
        info!("  {line}");
    }
    info!("{rule}");
}

/// Map a run failure to the process exit code.
///
/// A failing step propagates its own code when it fits a process exit
/// status; every other failure maps to 1.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let code = err
        .downcast_ref::<PipelineError>()
        .map_or(1, PipelineError::exit_code);
    u8::try_from(code)
        .ok()
        .filter(|code| *code != 0)
        .unwrap_or(1)
}

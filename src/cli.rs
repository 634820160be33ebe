//! Command line interface definition using clap.
//!
//! [`Cli`] carries the global options and the optional subcommand; `run` is
//! the default. [`RunConfig::from_args`] validates the raw `run` arguments
//! before anything touches the project.

use crate::domain::UserRequestTarget;
use crate::error::KompositError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Build multi-variant products from reusable components.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project directory. Defaults to the current directory.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute; defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the clap error when the arguments are invalid.
    pub fn try_parse_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::with_default_command)
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Run(RunArgs::default()));
        }
        self
    }
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Run a pipeline step, and every step before it unless `--single` is set.
    Run(RunArgs),
}

/// Arguments accepted by the `run` command.
#[derive(Debug, Args, Default, PartialEq, Eq, Clone)]
pub struct RunArgs {
    /// Variant to build. Chosen automatically when the project has only one.
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,

    /// Restrict the request to one component of the variant.
    #[arg(long, value_name = "NAME")]
    pub component: Option<String>,

    /// Build-tool target kind, such as `build`, `compile` or a custom name.
    #[arg(long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Name of the pipeline step to run, as written in the configuration.
    #[arg(long, value_name = "STEP")]
    pub step: Option<String>,

    /// Only run the step named by `--step`, without the steps before it.
    #[arg(long)]
    pub single: bool,

    /// Run steps even when their outputs are up to date.
    #[arg(long)]
    pub force_run: bool,

    /// Print project information instead of running the pipeline.
    #[arg(long)]
    pub print: bool,

    /// Show one progress line per step instead of log messages.
    #[arg(long)]
    pub progress: bool,
}

/// Validated settings of a `run` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Requested variant.
    pub variant: Option<String>,
    /// Requested component.
    pub component: Option<String>,
    /// Requested target kind. Defaults to build for variants and compile for
    /// components.
    pub target: UserRequestTarget,
    /// Requested step.
    pub step: Option<String>,
    /// Run only the requested step.
    pub single: bool,
    /// Ignore up-to-date checks.
    pub force_run: bool,
    /// Print project information only.
    pub print: bool,
    /// Use the progress-line reporter.
    pub progress: bool,
}

fn non_empty(option: &'static str, value: Option<&String>) -> Result<Option<String>, KompositError> {
    match value.map(|v| v.trim()) {
        Some("") => Err(KompositError::InvalidOption {
            option,
            reason: "value must not be empty".to_owned(),
        }),
        other => Ok(other.map(str::to_owned)),
    }
}

impl RunConfig {
    /// Validate raw `run` arguments.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::InvalidOption`] for empty values or when
    /// `--single` is given without `--step`.
    pub fn from_args(args: &RunArgs) -> Result<Self, KompositError> {
        let variant = non_empty("--variant", args.variant.as_ref())?;
        let component = non_empty("--component", args.component.as_ref())?;
        let step = non_empty("--step", args.step.as_ref())?;
        if args.single && step.is_none() {
            return Err(KompositError::InvalidOption {
                option: "--single",
                reason: "requires --step".to_owned(),
            });
        }
        let target = match non_empty("--target", args.target.as_ref())? {
            Some(target) => UserRequestTarget::from(target.as_str()),
            None if component.is_some() => UserRequestTarget::Compile,
            None => UserRequestTarget::Build,
        };
        Ok(Self {
            variant,
            component,
            target,
            step,
            single: args.single,
            force_run: args.force_run,
            print: args.print,
            progress: args.progress,
        })
    }
}

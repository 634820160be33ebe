//! Up-to-date checks based on file modification times.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs;
use std::io;
use std::time::SystemTime;

/// Why a step has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtyReason {
    /// The step declares no outputs, so it can never be up to date.
    NoOutputs,
    /// A declared output does not exist.
    MissingOutput(Utf8PathBuf),
    /// A declared input does not exist.
    MissingInput(Utf8PathBuf),
    /// An input was modified after the oldest output.
    NewerInput {
        /// The newest input.
        input: Utf8PathBuf,
        /// The oldest output.
        output: Utf8PathBuf,
    },
}

impl fmt::Display for DirtyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOutputs => f.write_str("no outputs declared"),
            Self::MissingOutput(path) => write!(f, "output {path} is missing"),
            Self::MissingInput(path) => write!(f, "input {path} is missing"),
            Self::NewerInput { input, output } => write!(f, "{input} is newer than {output}"),
        }
    }
}

fn modified(path: &Utf8Path) -> io::Result<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta.modified().map(Some),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Decide whether a step with the given files has to run.
///
/// Returns `None` when every output exists and no input is strictly newer
/// than the oldest output.
///
/// # Errors
///
/// Returns an error if a file's metadata cannot be read for a reason other
/// than its absence.
pub fn dirty_reason(
    inputs: &[Utf8PathBuf],
    outputs: &[Utf8PathBuf],
) -> io::Result<Option<DirtyReason>> {
    let mut oldest_output: Option<(SystemTime, &Utf8PathBuf)> = None;
    for output in outputs {
        let Some(time) = modified(output)? else {
            return Ok(Some(DirtyReason::MissingOutput(output.clone())));
        };
        if oldest_output.is_none_or(|(oldest, _)| time < oldest) {
            oldest_output = Some((time, output));
        }
    }
    let Some((oldest, oldest_path)) = oldest_output else {
        return Ok(Some(DirtyReason::NoOutputs));
    };

    let mut newest_input: Option<(SystemTime, &Utf8PathBuf)> = None;
    for input in inputs {
        let Some(time) = modified(input)? else {
            return Ok(Some(DirtyReason::MissingInput(input.clone())));
        };
        if newest_input.is_none_or(|(newest, _)| time > newest) {
            newest_input = Some((time, input));
        }
    }
    Ok(newest_input
        .filter(|(newest, _)| *newest > oldest)
        .map(|(_, input)| DirtyReason::NewerInput {
            input: input.clone(),
            output: oldest_path.clone(),
        }))
}

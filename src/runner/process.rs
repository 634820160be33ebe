//! Subprocess helpers for the external build tool and command steps.
//!
//! Children inherit the environment with the configured install directories
//! prepended to `PATH`. Their standard streams are forwarded line by line
//! from helper threads and their exit code is returned verbatim.

use camino::{Utf8Path, Utf8PathBuf};
use cmake_env::{CMAKE_ENV, CMAKE_PROGRAM};
use itertools::Itertools;
use std::env;
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// Directory below the output directory `CMake` configures into.
pub const CMAKE_BUILD_DIR: &str = "build";

/// Exit code reported when a child is terminated by a signal.
const SIGNALLED_EXIT_CODE: i32 = 1;

fn resolve_cmake_program_with<F>(mut read_env: F) -> Utf8PathBuf
where
    F: FnMut(&str) -> Option<OsString>,
{
    read_env(CMAKE_ENV)
        .and_then(|value| Utf8PathBuf::from_path_buf(PathBuf::from(value)).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(CMAKE_PROGRAM))
}

/// Determine which `CMake` executable to invoke, honouring `KOMPOSIT_CMAKE`.
#[must_use]
pub fn resolve_cmake_program() -> Utf8PathBuf {
    resolve_cmake_program_with(|key| env::var_os(key))
}

/// Build a `PATH` value with `install_dirs` in front of `current`.
///
/// Returns `None` when there is nothing to prepend.
fn prepend_search_path(install_dirs: &[Utf8PathBuf], current: Option<OsString>) -> Option<OsString> {
    if install_dirs.is_empty() {
        return None;
    }
    let existing = current
        .as_deref()
        .map(env::split_paths)
        .into_iter()
        .flatten();
    let dirs = install_dirs
        .iter()
        .map(|dir| dir.as_std_path().to_path_buf())
        .chain(existing);
    match env::join_paths(dirs) {
        Ok(joined) => Some(joined),
        Err(err) => {
            warn!(error = %err, "cannot extend PATH with install directories");
            None
        }
    }
}

/// Describe how to launch a child process.
#[derive(Debug, Clone)]
pub struct ToolInvocation<'a> {
    /// Program to run.
    pub program: &'a Utf8Path,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub current_dir: &'a Utf8Path,
    /// Directories prepended to `PATH`.
    pub install_dirs: &'a [Utf8PathBuf],
}

impl ToolInvocation<'_> {
    fn command(&self) -> Command {
        let mut cmd = Command::new(self.program.as_std_path());
        cmd.args(&self.args)
            .current_dir(self.current_dir.as_std_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(path) = prepend_search_path(self.install_dirs, env::var_os("PATH")) {
            cmd.env("PATH", path);
        }
        cmd
    }

    /// Run the child to completion, forwarding its output.
    ///
    /// Returns the child's exit code.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the process cannot be spawned or waited on.
    pub fn run(&self) -> io::Result<i32> {
        info!(
            "Running command: {} {}",
            self.program,
            self.args.iter().join(" ")
        );
        let child = self.command().spawn()?;
        let status = spawn_and_stream_output(child)?;
        Ok(exit_code(status))
    }
}

/// Configure the generated project in `source_dir` and build `target`.
///
/// Runs `<program> -S <source_dir> -B <source_dir>/build` followed by
/// `<program> --build <source_dir>/build --target <target>`. A failing
/// configure stops before the build.
///
/// # Errors
///
/// Returns an [`io::Error`] if either process cannot be spawned.
pub fn run_cmake(
    program: &Utf8Path,
    install_dirs: &[Utf8PathBuf],
    source_dir: &Utf8Path,
    target: &str,
) -> io::Result<i32> {
    let build_dir = source_dir.join(CMAKE_BUILD_DIR);
    let configure = ToolInvocation {
        program,
        args: vec![
            "-S".to_owned(),
            source_dir.to_string(),
            "-B".to_owned(),
            build_dir.to_string(),
        ],
        current_dir: source_dir,
        install_dirs,
    };
    let code = configure.run()?;
    if code != 0 {
        return Ok(code);
    }
    let build = ToolInvocation {
        args: vec![
            "--build".to_owned(),
            build_dir.to_string(),
            "--target".to_owned(),
            target.to_owned(),
        ],
        ..configure
    };
    build.run()
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or_else(|| {
        debug!(%status, "child terminated without an exit code");
        SIGNALLED_EXIT_CODE
    })
}

fn spawn_and_stream_output(mut child: Child) -> io::Result<ExitStatus> {
    let Some(stdout) = child.stdout.take() else {
        terminate_child(&mut child, "stdout pipe unavailable");
        return Err(io::Error::other("child process missing stdout pipe"));
    };
    let Some(stderr) = child.stderr.take() else {
        terminate_child(&mut child, "stderr pipe unavailable");
        return Err(io::Error::other("child process missing stderr pipe"));
    };

    let out_handle = thread::spawn(move || forward_lines(stdout, &mut io::stdout().lock()));
    let err_handle = thread::spawn(move || forward_lines(stderr, &mut io::stderr().lock()));

    let status = child.wait()?;
    for (handle, stream_name) in [(out_handle, "stdout"), (err_handle, "stderr")] {
        if handle.join().is_err() {
            warn!("{stream_name} forwarding thread panicked");
        }
    }
    Ok(status)
}

fn terminate_child(child: &mut Child, context: &str) {
    if let Err(err) = child.kill() {
        debug!("failed to kill child after {context}: {err}");
    }
    if let Err(err) = child.wait() {
        debug!("failed to reap child after {context}: {err}");
    }
}

/// Copy `reader` to `writer` one raw line at a time.
///
/// Bytes are passed through untouched, so output in a non-UTF-8 locale is
/// forwarded as is. Once the writer fails the remaining output is drained
/// into [`io::sink`] so the child never writes into a closed pipe.
fn forward_lines<R: Read, W: Write>(reader: R, writer: &mut W) -> usize {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut forwarded = 0;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(error = %err, "failed to read child output");
                break;
            }
        }
        if let Err(err) = writer.write_all(&line) {
            debug!(error = %err, "output forwarding failed; discarding remaining output");
            if let Err(drain_err) = io::copy(&mut reader, &mut io::sink()) {
                debug!(error = %drain_err, "failed to drain child output");
            }
            break;
        }
        forwarded += 1;
    }
    forwarded
}

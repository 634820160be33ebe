//! Scripted stand-in for the `cmake` executable.
//!
//! The script appends every invocation's arguments to a log file and exits
//! with a configurable status for the configure and build phases.

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use std::fs::{self, File};
use std::io::Write;
use tempfile::TempDir;

/// A fake `cmake` living in its own temporary directory.
#[derive(Debug)]
pub struct FakeCmake {
    _dir: TempDir,
    program: Utf8PathBuf,
    log: Utf8PathBuf,
}

#[cfg(unix)]
fn make_script_executable(path: &Utf8PathBuf) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)
        .with_context(|| format!("read metadata {path}"))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).with_context(|| format!("set permissions {path}"))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_script_executable(_path: &Utf8PathBuf) -> Result<()> {
    Ok(())
}

impl FakeCmake {
    /// Create a fake `cmake` that exits with `configure_exit` when
    /// configuring and `build_exit` for `--build` invocations.
    pub fn new(configure_exit: i32, build_exit: i32) -> Result<Self> {
        let dir = TempDir::new().context("create fake cmake dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("temp dir {} is not UTF-8", p.display()))?;
        let program = root.join("cmake");
        let log = root.join("invocations.log");
        let mut file = File::create(&program).with_context(|| format!("create {program}"))?;
        writeln!(
            file,
            concat!(
                "#!/bin/sh\n",
                "echo \"$@\" >> \"{log}\"\n",
                "if [ \"$1\" = \"--build\" ]; then\n",
                "  echo \"building $4\"\n",
                "  exit {build}\n",
                "fi\n",
                "exit {configure}"
            ),
            log = log,
            build = build_exit,
            configure = configure_exit,
        )
        .with_context(|| format!("write {program}"))?;
        drop(file);
        make_script_executable(&program)?;
        Ok(Self {
            _dir: dir,
            program,
            log,
        })
    }

    /// A fake `cmake` that always succeeds.
    pub fn succeeding() -> Result<Self> {
        Self::new(0, 0)
    }

    /// Path of the executable script.
    pub fn program(&self) -> &Utf8PathBuf {
        &self.program
    }

    /// Argument lines recorded so far, one per invocation.
    pub fn invocations(&self) -> Result<Vec<String>> {
        if !self.log.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.log).with_context(|| format!("read {}", self.log))?;
        Ok(text.lines().map(str::to_owned).collect())
    }
}

//! Temporary project directories populated with `komposit.yaml` files.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Pipeline with a generation step followed by a build step.
pub const GENERATE_AND_BUILD: &str = concat!(
    "pipeline:\n",
    "  - step: generate\n",
    "    kind: generate\n",
    "  - step: build\n",
    "    kind: build\n",
);

/// A project directory deleted when the fixture is dropped.
#[derive(Debug)]
pub struct ProjectFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl ProjectFixture {
    /// Create an empty project.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create project dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow!("temp dir {} is not UTF-8", p.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Project root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `content` to `rel` below the root, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, content).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// A project with `app` nesting `math`, both in variant `V`, plus the
    /// given pipeline document appended to the root configuration.
    pub fn worked_example(pipeline: &str) -> Result<Self> {
        let project = Self::new()?;
        project.write(
            "komposit.yaml",
            &format!("variants:\n  - name: V\n    bom: [app, math]\n{pipeline}"),
        )?;
        project.write(
            "app/komposit.yaml",
            "components:\n  - name: app\n    sources: [main.c]\n    components: [math]\n",
        )?;
        project.write(
            "math/komposit.yaml",
            "components:\n  - name: math\n    sources: [a.c]\n",
        )?;
        project.write("app/main.c", "int main(void) { return 0; }\n")?;
        project.write("math/a.c", "int add(int a, int b) { return a + b; }\n")?;
        Ok(project)
    }
}

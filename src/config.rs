//! Project configuration loading.
//!
//! A project is described by any number of `komposit.yaml` files below the
//! project directory. Each file may contribute components, variants, a
//! pipeline and extra include or install directories. Files are parsed with
//! `serde-saphyr` and aggregated into a [`ProjectConfig`], whose component
//! pool rejects names defined more than once.
//!
//! ```rust
//! use komposit::config::UserConfig;
//!
//! let yaml = "components:\n  - name: math\n    sources: [a.c]\n";
//! let config = UserConfig::from_str_named(yaml, None).expect("parse");
//! assert_eq!(config.components[0].name, "math");
//! ```

use crate::domain::ComponentDefinitionPool;
use crate::error::KompositError;
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// File name searched for when discovering configuration files.
pub const CONFIG_FILE_NAME: &str = "komposit.yaml";

/// Directory names never descended into during discovery.
const EXCLUDED_DIRS: &[&str] = &[".git", ".github", ".vscode", "build", ".venv", "target"];

/// A reusable unit of source code as written in a configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Unique component name.
    pub name: String,
    /// Source globs relative to the defining file.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Test source globs relative to the defining file.
    #[serde(default)]
    pub test_sources: Vec<String>,
    /// Names of nested components.
    #[serde(default)]
    pub components: Vec<String>,
}

/// A named product configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VariantConfig {
    /// Variant name.
    pub name: String,
    /// Bill of materials: the component names composing the variant.
    #[serde(default)]
    pub bom: Vec<String>,
    /// Optional variant specific configuration file, relative to the project.
    #[serde(default)]
    pub config_file: Option<String>,
}

/// Kind of work a pipeline step performs.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Generate the build scripts for the selected variant.
    Generate,
    /// Hand off to the external build tool.
    Build,
    /// Run a user supplied command.
    Command,
}

/// One entry of the ordered pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Step name used on the command line.
    pub step: String,
    /// Behaviour of the step.
    pub kind: StepKind,
    /// Program and arguments for [`StepKind::Command`] steps.
    #[serde(default)]
    pub run: Vec<String>,
    /// Declared inputs, relative to the project directory.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Declared outputs, relative to the project directory.
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Contents of a single configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub file: Option<Utf8PathBuf>,
    /// Component definitions.
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
    /// Variant definitions.
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
    /// Ordered pipeline steps.
    #[serde(default)]
    pub pipeline: Option<Vec<StepConfig>>,
    /// Additional include directories, relative to this file.
    #[serde(default)]
    pub include_directories: Vec<String>,
    /// Directories prepended to `PATH` for the external build tool.
    #[serde(default)]
    pub install_dirs: Vec<String>,
}

impl UserConfig {
    /// Parse a configuration document, recording `file` as its origin.
    ///
    /// An empty document yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or contains unknown keys.
    pub fn from_str_named(yaml: &str, file: Option<Utf8PathBuf>) -> Result<Self> {
        let origin = crate::error::describe_location(file.as_deref());
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_saphyr::from_str(yaml).with_context(|| format!("failed to parse {origin}"))?
        };
        config.file = file;
        Ok(config)
    }

    /// Load a configuration file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Utf8Path) -> Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        Self::from_str_named(&data, Some(path.to_path_buf()))
    }

    /// Directory relative paths in this file are resolved against.
    #[must_use]
    pub fn base_dir<'a>(&'a self, project_dir: &'a Utf8Path) -> &'a Utf8Path {
        self.file
            .as_deref()
            .and_then(Utf8Path::parent)
            .unwrap_or(project_dir)
    }
}

/// Aggregated view over every configuration file of a project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Root directory of the project.
    pub project_dir: Utf8PathBuf,
    /// Parsed configuration files in discovery order.
    pub user_configs: Vec<UserConfig>,
    /// Deduplicated component definitions.
    pub pool: ComponentDefinitionPool,
    /// Variants from all files, in discovery order.
    pub variants: Vec<VariantConfig>,
    /// The first pipeline found.
    pub pipeline: Option<Vec<StepConfig>>,
    /// Additional include directories from all files.
    pub include_directories: Vec<Utf8PathBuf>,
    /// Install directories from all files.
    pub install_dirs: Vec<Utf8PathBuf>,
}

impl ProjectConfig {
    /// Aggregate already parsed configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::DuplicateComponent`] when two files define a
    /// component with the same name.
    pub fn from_user_configs(
        project_dir: Utf8PathBuf,
        user_configs: Vec<UserConfig>,
    ) -> Result<Self, KompositError> {
        let pool = ComponentDefinitionPool::build(&user_configs)?;
        let variants = user_configs
            .iter()
            .flat_map(|config| config.variants.iter().cloned())
            .collect();
        let pipeline = user_configs
            .iter()
            .find_map(|config| config.pipeline.clone());
        let mut include_directories = Vec::new();
        let mut install_dirs = Vec::new();
        for config in &user_configs {
            let base = config.base_dir(&project_dir);
            include_directories.extend(config.include_directories.iter().map(|d| base.join(d)));
            install_dirs.extend(config.install_dirs.iter().map(|d| base.join(d)));
        }
        Ok(Self {
            project_dir,
            user_configs,
            pool,
            variants,
            pipeline,
            include_directories,
            install_dirs,
        })
    }

    /// Paths of all loaded configuration files.
    #[must_use]
    pub fn config_files(&self) -> Vec<Utf8PathBuf> {
        self.user_configs
            .iter()
            .filter_map(|config| config.file.clone())
            .collect()
    }

    /// Names of all variants in declaration order.
    #[must_use]
    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.name.as_str()).collect()
    }

    /// Look up a variant by name.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::VariantNotFound`] if no variant has that name.
    pub fn variant(&self, name: &str) -> Result<&VariantConfig, KompositError> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| KompositError::VariantNotFound {
                variant: name.to_owned(),
            })
    }

    /// Resolve the variant specific configuration file, if one is declared.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::VariantNotFound`] if no variant has that name.
    pub fn variant_config_file(&self, name: &str) -> Result<Option<Utf8PathBuf>, KompositError> {
        let variant = self.variant(name)?;
        Ok(variant
            .config_file
            .as_ref()
            .map(|file| self.project_dir.join(file)))
    }
}

/// Find every configuration file below `project_dir`.
///
/// Files closer to the project root come first; ties are broken by path so
/// the order is stable across runs.
///
/// # Errors
///
/// Returns an error if a directory cannot be read or a path is not UTF-8.
pub fn discover_config_files(project_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(project_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to scan {project_dir}"))?;
        if entry.file_type().is_file() && entry.file_name() == CONFIG_FILE_NAME {
            let path = Utf8PathBuf::from_path_buf(entry.into_path())
                .map_err(|p| anyhow!("configuration path {} is not valid UTF-8", p.display()))?;
            files.push(path);
        }
    }
    files.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });
    Ok(files)
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

/// Discover, parse and aggregate the configuration of a project.
///
/// # Errors
///
/// Returns an error if discovery or parsing fails, or if component names
/// clash across files.
pub fn load_project(project_dir: &Utf8Path) -> Result<ProjectConfig> {
    let files = discover_config_files(project_dir)?;
    debug!(count = files.len(), "discovered configuration files");
    let user_configs = files
        .iter()
        .map(|file| UserConfig::from_path(file))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProjectConfig::from_user_configs(
        project_dir.to_path_buf(),
        user_configs,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn write(root: &Utf8Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write config");
    }

    fn temp_project() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        (dir, root)
    }

    #[rstest]
    fn parses_full_document() {
        let yaml = concat!(
            "components:\n",
            "  - name: app\n",
            "    sources: [main.c]\n",
            "    test_sources: [test_main.cc]\n",
            "    components: [math]\n",
            "variants:\n",
            "  - name: V\n",
            "    bom: [app, math]\n",
            "    config_file: variants/V/config.txt\n",
            "pipeline:\n",
            "  - step: gen\n",
            "    kind: generate\n",
            "  - step: lint\n",
            "    kind: command\n",
            "    run: [echo, hi]\n",
        );
        let config = UserConfig::from_str_named(yaml, None).expect("parse");
        let app = config.components.first().expect("component");
        assert_eq!(app.components, vec!["math".to_owned()]);
        assert_eq!(app.test_sources, vec!["test_main.cc".to_owned()]);
        let variant = config.variants.first().expect("variant");
        assert_eq!(variant.config_file.as_deref(), Some("variants/V/config.txt"));
        let pipeline = config.pipeline.expect("pipeline");
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.get(1).map(|s| s.kind), Some(StepKind::Command));
    }

    #[rstest]
    fn empty_document_is_empty_config() {
        let config = UserConfig::from_str_named("\n", None).expect("parse");
        assert!(config.components.is_empty());
        assert!(config.pipeline.is_none());
    }

    #[rstest]
    fn unknown_key_is_rejected() {
        let err = UserConfig::from_str_named("componentz: []\n", None).expect_err("unknown key");
        assert!(err.to_string().contains("failed to parse"), "{err}");
    }

    #[rstest]
    fn discovery_skips_excluded_dirs_and_orders_by_depth() {
        let (_dir, root) = temp_project();
        write(&root, "lib/math/komposit.yaml", "");
        write(&root, "komposit.yaml", "");
        write(&root, "build/komposit.yaml", "");
        write(&root, ".git/komposit.yaml", "");
        write(&root, "app/komposit.yaml", "");

        let files = discover_config_files(&root).expect("discover");
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(&root).expect("prefix").to_string())
            .collect();
        assert_eq!(
            relative,
            vec![
                "komposit.yaml".to_owned(),
                "app/komposit.yaml".to_owned(),
                "lib/math/komposit.yaml".to_owned(),
            ]
        );
    }

    #[rstest]
    fn duplicate_components_across_files_fail() {
        let (_dir, root) = temp_project();
        write(&root, "a/komposit.yaml", "components:\n  - name: math\n");
        write(&root, "b/komposit.yaml", "components:\n  - name: math\n");

        let err = load_project(&root).expect_err("duplicate");
        let text = err.to_string();
        assert!(text.contains(root.join("a/komposit.yaml").as_str()), "{text}");
        assert!(text.contains(root.join("b/komposit.yaml").as_str()), "{text}");
    }

    #[rstest]
    fn project_aggregates_directories_relative_to_file() {
        let (_dir, root) = temp_project();
        write(
            &root,
            "komposit.yaml",
            "variants:\n  - name: V\n    bom: [app]\n    config_file: cfg/v.txt\ninstall_dirs: [tools]\n",
        );
        write(
            &root,
            "app/komposit.yaml",
            "components:\n  - name: app\ninclude_directories: [include]\n",
        );

        let project = load_project(&root).expect("load");
        assert_eq!(project.include_directories, vec![root.join("app/include")]);
        assert_eq!(project.install_dirs, vec![root.join("tools")]);
        assert_eq!(project.variant_names(), vec!["V"]);
        assert_eq!(
            project.variant_config_file("V").expect("variant"),
            Some(root.join("cfg/v.txt"))
        );
        assert_eq!(project.config_files().len(), 2);
        assert!(project.pipeline.is_none());
    }

    #[rstest]
    fn unknown_variant_is_reported() {
        let project =
            ProjectConfig::from_user_configs(Utf8PathBuf::from("/p"), Vec::new()).expect("empty");
        assert_eq!(
            project.variant("X"),
            Err(KompositError::VariantNotFound {
                variant: "X".into()
            })
        );
    }
}

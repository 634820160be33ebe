//! State shared by every step of a pipeline run.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

use super::{Component, ResolvedVariant};

/// Whether a request targets a whole variant or one of its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRequestScope {
    /// The whole variant.
    Variant,
    /// A single component of the variant.
    Component,
}

/// Build-tool target kind requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRequestTarget {
    /// Build the product.
    Build,
    /// Compile without linking.
    Compile,
    /// Any other target the build script provides.
    Custom(String),
}

impl UserRequestTarget {
    /// Target kind as it appears in target names.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Build => "build",
            Self::Compile => "compile",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for UserRequestTarget {
    fn from(value: &str) -> Self {
        match value {
            "build" => Self::Build,
            "compile" => Self::Compile,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl fmt::Display for UserRequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user asked to build.
///
/// Only used to name build-tool targets; resolution is unaffected.
///
/// ```rust
/// use komposit::domain::{UserRequest, UserRequestTarget};
///
/// let variant = UserRequest::variant("V", UserRequestTarget::Build);
/// assert_eq!(variant.target_name(), "build-V");
/// let component = UserRequest::component("V", "math", UserRequestTarget::Compile);
/// assert_eq!(component.target_name(), "compile-V-math");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRequest {
    /// Variant or component scope.
    pub scope: UserRequestScope,
    /// Selected variant.
    pub variant_name: String,
    /// Selected component for component-scoped requests.
    pub component_name: Option<String>,
    /// Requested target kind.
    pub target: UserRequestTarget,
}

impl UserRequest {
    /// Request `target` for the whole variant.
    #[must_use]
    pub fn variant(variant_name: &str, target: UserRequestTarget) -> Self {
        Self {
            scope: UserRequestScope::Variant,
            variant_name: variant_name.to_owned(),
            component_name: None,
            target,
        }
    }

    /// Request `target` for one component of the variant.
    #[must_use]
    pub fn component(variant_name: &str, component_name: &str, target: UserRequestTarget) -> Self {
        Self {
            scope: UserRequestScope::Component,
            variant_name: variant_name.to_owned(),
            component_name: Some(component_name.to_owned()),
            target,
        }
    }

    /// Build-tool target name: `<target>-<variant>` for variant requests and
    /// `<target>-<variant>-<component>` for component requests.
    #[must_use]
    pub fn target_name(&self) -> String {
        match (self.scope, &self.component_name) {
            (UserRequestScope::Component, Some(component)) => {
                format!("{}-{}-{component}", self.target, self.variant_name)
            }
            _ => format!("{}-{}", self.target, self.variant_name),
        }
    }
}

/// Facts about the current run, read by every step and extended by their
/// context-update hooks.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Project root.
    pub project_dir: Utf8PathBuf,
    /// Directory receiving generated files.
    pub output_dir: Utf8PathBuf,
    /// Resolved components of the selected variant.
    pub variant: ResolvedVariant,
    /// The originating request.
    pub user_request: UserRequest,
    /// Loaded configuration files.
    pub user_config_files: Vec<Utf8PathBuf>,
    /// Variant specific configuration file, if declared.
    pub variant_config_file: Option<Utf8PathBuf>,
    /// Include directories added on top of the component directories.
    pub include_directories: Vec<Utf8PathBuf>,
    /// Directories prepended to `PATH` for external tools.
    pub install_dirs: Vec<Utf8PathBuf>,
    /// Build scripts written by the generation step.
    pub generated_files: Vec<Utf8PathBuf>,
}

impl ExecutionContext {
    /// Create a context writing to `<project>/build/<variant>`.
    #[must_use]
    pub fn new(project_dir: &Utf8Path, variant: ResolvedVariant, user_request: UserRequest) -> Self {
        let output_dir = project_dir.join("build").join(variant.name());
        Self {
            project_dir: project_dir.to_path_buf(),
            output_dir,
            variant,
            user_request,
            user_config_files: Vec::new(),
            variant_config_file: None,
            include_directories: Vec::new(),
            install_dirs: Vec::new(),
            generated_files: Vec::new(),
        }
    }

    /// Name of the selected variant.
    #[must_use]
    pub fn variant_name(&self) -> &str {
        self.variant.name()
    }

    /// Resolved components in bom order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        self.variant.components()
    }

    /// Build-tool target for the current request.
    #[must_use]
    pub fn target_name(&self) -> String {
        self.user_request.target_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("build", UserRequestTarget::Build)]
    #[case("compile", UserRequestTarget::Compile)]
    #[case("docs", UserRequestTarget::Custom("docs".into()))]
    fn parses_target(#[case] raw: &str, #[case] expected: UserRequestTarget) {
        assert_eq!(UserRequestTarget::from(raw), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn component_scope_without_name_falls_back_to_variant() {
        let request = UserRequest {
            scope: UserRequestScope::Component,
            variant_name: "V".into(),
            component_name: None,
            target: UserRequestTarget::Custom("docs".into()),
        };
        assert_eq!(request.target_name(), "docs-V");
    }

    #[rstest]
    fn output_dir_is_per_variant() {
        let context = ExecutionContext::new(
            Utf8Path::new("/p"),
            ResolvedVariant::new("V".into(), Vec::new()),
            UserRequest::variant("V", UserRequestTarget::Build),
        );
        assert_eq!(context.output_dir, Utf8PathBuf::from("/p/build/V"));
        assert_eq!(context.target_name(), "build-V");
        assert!(context.components().is_empty());
    }
}

//! `CMake` build script generator.
//!
//! Converts the resolved components of an [`ExecutionContext`] into an
//! ordered list of [`BuildGraphElement`]s and renders them. Ordering depends
//! only on the resolved input, so regenerating an unchanged project yields
//! byte-identical files and keeps the downstream build step incremental.
//!
//! ```rust
//! use camino::Utf8Path;
//! use komposit::cmake_gen::{generate, render};
//! use komposit::config::{ComponentConfig, UserConfig, VariantConfig};
//! use komposit::domain::{
//!     ComponentDefinitionPool, ExecutionContext, UserRequest, UserRequestTarget, resolve_variant,
//! };
//!
//! let config = UserConfig {
//!     components: vec![ComponentConfig {
//!         name: "app".into(),
//!         sources: vec!["main.c".into()],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//! let pool = ComponentDefinitionPool::build(&[config]).expect("pool");
//! let variant = VariantConfig { name: "V".into(), bom: vec!["app".into()], config_file: None };
//! let project = Utf8Path::new("/project");
//! let resolved = resolve_variant(&variant, &pool, project).expect("resolve");
//! let context = ExecutionContext::new(
//!     project,
//!     resolved,
//!     UserRequest::variant("V", UserRequestTarget::Build),
//! );
//! let script = render(&generate(&context));
//! assert!(script.contains("add_library(app OBJECT"));
//! assert!(script.contains("add_custom_target(build-V"));
//! ```

mod element;

pub use element::{BuildGraphElement, render};

use crate::domain::{ComponentAnalyzer, ExecutionContext, UserRequest, UserRequestTarget};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use minijinja::{Environment, context};
use std::collections::HashSet;
use std::fs;
use thiserror::Error;
use tracing::{debug, info};

/// Top-level script consumed by `cmake -S`.
pub const CMAKE_LISTS_FILE: &str = "CMakeLists.txt";
/// Script holding the generated variant elements.
pub const VARIANT_CMAKE_FILE: &str = "variant.cmake";
/// Name of the linked product inside the generated project.
pub const EXECUTABLE_NAME: &str = "${PROJECT_NAME}";

const MINIMUM_CMAKE_VERSION: &str = "3.20";

const CMAKE_LISTS_TEMPLATE: &str = "\
# Generated by komposit. Do not edit.
cmake_minimum_required(VERSION {{ min_version }})

project({{ project }} C CXX)

include(${CMAKE_CURRENT_LIST_DIR}/{{ variant_file }})
";

/// Errors raised while producing build scripts.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A custom target depends on a target declared later or never.
    #[error("target '{target}' depends on '{dependency}' which is not declared before it")]
    ForwardReference {
        /// Dependent target.
        target: String,
        /// Undeclared dependency.
        dependency: String,
    },
    /// Two elements declare the same target.
    #[error("target '{target}' is declared more than once")]
    DuplicateTarget {
        /// Target name as `CMake` sees it.
        target: String,
    },
    /// The top-level template failed to render.
    #[error("failed to render {CMAKE_LISTS_FILE}")]
    Template(#[from] minijinja::Error),
}

/// Produce the ordered build-graph elements for the context's variant.
///
/// Components are emitted so that nested components precede the components
/// nesting them. Only top-level components are linked into the executable.
#[must_use]
pub fn generate(context: &ExecutionContext) -> Vec<BuildGraphElement> {
    let variant = &context.variant;
    let variant_name = context.variant_name();
    let mut elements = vec![BuildGraphElement::Comment(format!(
        "Generated by komposit for variant {variant_name}"
    ))];

    let mut include_dirs = ComponentAnalyzer::for_variant(variant).collect_include_directories();
    include_dirs.extend(context.include_directories.iter().cloned());
    elements.push(BuildGraphElement::IncludeDirectories(include_dirs));

    for id in variant.dependency_order() {
        let Some(component) = variant.get(id) else {
            continue;
        };
        elements.push(BuildGraphElement::ObjectLibrary {
            name: component.name.clone(),
            sources: component.sources.clone(),
        });
        let compile = UserRequest::component(variant_name, &component.name, UserRequestTarget::Compile);
        elements.push(BuildGraphElement::CustomTarget {
            name: compile.target_name(),
            description: format!("Compile component {}", component.name),
            depends: Vec::new(),
            target_depends: vec![component.name.clone()],
        });
    }

    elements.push(BuildGraphElement::Executable {
        name: EXECUTABLE_NAME.to_owned(),
        libraries: variant
            .top_level()
            .map(|(_, component)| component.name.clone())
            .collect(),
    });
    elements.push(BuildGraphElement::CustomTarget {
        name: UserRequest::variant(variant_name, UserRequestTarget::Build).target_name(),
        description: format!("Build variant {variant_name}"),
        depends: Vec::new(),
        target_depends: vec![EXECUTABLE_NAME.to_owned()],
    });
    elements
}

/// Check that every target is declared once and that custom targets only
/// depend on targets declared before them.
///
/// `project_name` stands in for [`EXECUTABLE_NAME`], which `CMake` expands
/// to the project declared in [`CMAKE_LISTS_FILE`].
///
/// # Errors
///
/// Returns [`GeneratorError::ForwardReference`] or
/// [`GeneratorError::DuplicateTarget`] naming the first offender.
pub fn validate_order(
    elements: &[BuildGraphElement],
    project_name: &str,
) -> Result<(), GeneratorError> {
    let expand = |name: &str| {
        if name == EXECUTABLE_NAME {
            project_name.to_owned()
        } else {
            name.to_owned()
        }
    };
    let mut declared = HashSet::new();
    for element in elements {
        if let BuildGraphElement::CustomTarget {
            name,
            target_depends,
            ..
        } = element
        {
            if let Some(missing) = target_depends
                .iter()
                .find(|dep| !declared.contains(&expand(dep)))
            {
                return Err(GeneratorError::ForwardReference {
                    target: name.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        if let Some(name) = element.target_name() {
            let target = expand(name);
            if !declared.insert(target.clone()) {
                return Err(GeneratorError::DuplicateTarget { target });
            }
        }
    }
    Ok(())
}

/// A build script ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Destination path.
    pub path: Utf8PathBuf,
    /// Full file content.
    pub content: String,
}

impl GeneratedFile {
    /// Write the file unless it already holds the same content.
    ///
    /// Returns whether the file was written. Leaving unchanged files alone
    /// keeps their timestamps stable for the build tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be written.
    pub fn write_if_changed(&self) -> Result<bool> {
        if fs::read_to_string(&self.path).is_ok_and(|existing| existing == self.content) {
            debug!(path = %self.path, "generated file unchanged");
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent}"))?;
        }
        fs::write(&self.path, &self.content)
            .with_context(|| format!("failed to write {}", self.path))?;
        info!("Generated {}", self.path);
        Ok(true)
    }
}

/// Paths of the files [`build_files`] produces in `output_dir`.
#[must_use]
pub fn generated_paths(output_dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    vec![
        output_dir.join(CMAKE_LISTS_FILE),
        output_dir.join(VARIANT_CMAKE_FILE),
    ]
}

/// Generate and render every build script for the context.
///
/// # Errors
///
/// Returns an error if the element order is invalid or the top-level
/// template fails to render.
pub fn build_files(context: &ExecutionContext) -> Result<Vec<GeneratedFile>, GeneratorError> {
    let elements = generate(context);
    validate_order(&elements, context.variant_name())?;

    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    let cmake_lists = env.render_str(
        CMAKE_LISTS_TEMPLATE,
        context! {
            min_version => MINIMUM_CMAKE_VERSION,
            project => context.variant_name(),
            variant_file => VARIANT_CMAKE_FILE,
        },
    )?;

    let mut variant_script = render(&elements);
    if !variant_script.ends_with('\n') {
        variant_script.push('\n');
    }
    let [lists_path, variant_path]: [Utf8PathBuf; 2] = [
        context.output_dir.join(CMAKE_LISTS_FILE),
        context.output_dir.join(VARIANT_CMAKE_FILE),
    ];
    Ok(vec![
        GeneratedFile {
            path: lists_path,
            content: cmake_lists,
        },
        GeneratedFile {
            path: variant_path,
            content: variant_script,
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn forward_reference_is_rejected() {
        let elements = vec![
            BuildGraphElement::CustomTarget {
                name: "build-V".into(),
                description: "Build variant V".into(),
                depends: Vec::new(),
                target_depends: vec!["app".into()],
            },
            BuildGraphElement::ObjectLibrary {
                name: "app".into(),
                sources: Vec::new(),
            },
        ];
        let err = validate_order(&elements, "V").expect_err("forward reference");
        assert!(matches!(
            err,
            GeneratorError::ForwardReference { ref target, ref dependency }
                if target == "build-V" && dependency == "app"
        ));
    }

    #[rstest]
    fn backward_reference_is_accepted() {
        let elements = vec![
            BuildGraphElement::ObjectLibrary {
                name: "app".into(),
                sources: Vec::new(),
            },
            BuildGraphElement::CustomTarget {
                name: "compile-V-app".into(),
                description: "Compile component app".into(),
                depends: Vec::new(),
                target_depends: vec!["app".into()],
            },
        ];
        assert!(validate_order(&elements, "V").is_ok());
    }

    #[rstest]
    #[case("app", Some("app"))]
    #[case("V", None)]
    fn executable_clashes_with_library_of_project_name(
        #[case] project: &str,
        #[case] clash: Option<&str>,
    ) {
        let elements = vec![
            BuildGraphElement::ObjectLibrary {
                name: "app".into(),
                sources: Vec::new(),
            },
            BuildGraphElement::Executable {
                name: EXECUTABLE_NAME.into(),
                libraries: vec!["app".into()],
            },
        ];
        match (validate_order(&elements, project), clash) {
            (Ok(()), None) => {}
            (Err(GeneratorError::DuplicateTarget { target }), Some(expected)) => {
                assert_eq!(target, expected);
            }
            (other, _) => panic!("unexpected result {other:?}"),
        }
    }

    #[rstest]
    fn generated_paths_live_in_output_dir() {
        assert_eq!(
            generated_paths(Utf8Path::new("/p/build/V")),
            vec![
                Utf8PathBuf::from("/p/build/V/CMakeLists.txt"),
                Utf8PathBuf::from("/p/build/V/variant.cmake"),
            ]
        );
    }
}

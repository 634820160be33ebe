//! Fatal user-facing errors.
//!
//! Every failure in resolution, scheduling or option validation is terminal:
//! the run stops and the message is reported as-is. Variants exist so callers
//! and tests can match on the cause, not to drive recovery.

// miette's derive expands to assignments some compiler versions flag as
// unused, and `#[expect]` fails on versions where the lint stays quiet.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8Path;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading, resolving or scheduling a project.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum KompositError {
    /// Two configuration files define a component with the same name.
    #[error(
        "Component '{name}' is defined in multiple configuration files. See {first} and {second}."
    )]
    #[diagnostic(
        code(komposit::config::duplicate_component),
        help("rename one of the components or remove the duplicate definition")
    )]
    DuplicateComponent {
        /// Component name defined twice.
        name: String,
        /// Location of the first definition.
        first: String,
        /// Location of the conflicting definition.
        second: String,
    },

    /// A bom entry names a component absent from every configuration file.
    #[error("Component '{name}' not found in the configuration (requested by variant '{variant}').")]
    #[diagnostic(code(komposit::resolve::component_not_found))]
    ComponentNotFound {
        /// Missing component name.
        name: String,
        /// Variant that requested it.
        variant: String,
    },

    /// A component nests a component that is not part of the variant's bom.
    #[error(
        "Component '{name}' not found in variant '{variant}' (referenced as subcomponent of '{parent}')."
    )]
    #[diagnostic(
        code(komposit::resolve::subcomponent_not_found),
        help("subcomponents must also be listed in the variant's bom")
    )]
    SubcomponentNotFound {
        /// Missing subcomponent name.
        name: String,
        /// Component declaring the subcomponent.
        parent: String,
        /// Variant being resolved.
        variant: String,
    },

    /// The variant has no bill of materials.
    #[error("Variant '{variant}' is empty (no 'bom' found).")]
    #[diagnostic(code(komposit::resolve::empty_variant))]
    EmptyVariant {
        /// Variant name.
        variant: String,
    },

    /// The requested variant is not defined.
    #[error("Variant '{variant}' not found in the configuration.")]
    #[diagnostic(code(komposit::config::variant_not_found))]
    VariantNotFound {
        /// Requested variant name.
        variant: String,
    },

    /// No variant was given and none could be chosen automatically.
    #[error("No variant selected. Stopping the execution. Available variants: {available}")]
    #[diagnostic(
        code(komposit::run::no_variant_selected),
        help("pass --variant to choose one")
    )]
    NoVariantSelected {
        /// Comma separated list of known variants.
        available: String,
    },

    /// No configuration file declares a pipeline.
    #[error("No pipeline found in the configuration.")]
    #[diagnostic(code(komposit::config::pipeline_not_found))]
    PipelineNotFound,

    /// The requested step is not part of the pipeline.
    #[error("Step '{step}' not found in the pipeline.")]
    #[diagnostic(code(komposit::pipeline::step_not_found))]
    StepNotFound {
        /// Requested step name.
        step: String,
    },

    /// The wired subcomponent graph contains a cycle.
    #[error("Component cycle detected in variant '{variant}': {}", .cycle.join(" -> "))]
    #[diagnostic(code(komposit::resolve::component_cycle))]
    ComponentCycle {
        /// Variant being resolved.
        variant: String,
        /// Component names along the cycle; the first name is repeated last.
        cycle: Vec<String>,
    },

    /// A source pattern of a component cannot be parsed as a glob.
    #[error("Invalid source pattern '{pattern}' in component '{component}': {reason}")]
    #[diagnostic(code(komposit::resolve::invalid_pattern))]
    InvalidSourcePattern {
        /// Component declaring the pattern.
        component: String,
        /// Offending pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// A pipeline step entry cannot be turned into a runnable step.
    #[error("Invalid pipeline step '{step}': {reason}")]
    #[diagnostic(code(komposit::pipeline::invalid_step))]
    InvalidStep {
        /// Step name as configured.
        step: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A command line option combination is not accepted.
    #[error("Invalid option '{option}': {reason}")]
    #[diagnostic(code(komposit::cli::invalid_option))]
    InvalidOption {
        /// Offending option.
        option: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Describe a defining-file location for error messages.
pub(crate) fn describe_location(file: Option<&Utf8Path>) -> String {
    file.map_or_else(|| "<unknown file>".to_owned(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_component_names_both_files() {
        let err = KompositError::DuplicateComponent {
            name: "math".into(),
            first: describe_location(Some(Utf8Path::new("a/komposit.yaml"))),
            second: describe_location(Some(Utf8Path::new("b/komposit.yaml"))),
        };
        let text = err.to_string();
        assert!(text.contains("a/komposit.yaml"), "{text}");
        assert!(text.contains("b/komposit.yaml"), "{text}");
    }

    #[test]
    fn cycle_message_lists_path() {
        let err = KompositError::ComponentCycle {
            variant: "V".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "Component cycle detected in variant 'V': a -> b -> a"
        );
    }

    #[test]
    fn unknown_location_is_described() {
        assert_eq!(describe_location(None), "<unknown file>");
    }
}

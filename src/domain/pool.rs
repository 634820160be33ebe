//! Deduplicated pool of component definitions.

use crate::config::{ComponentConfig, UserConfig};
use crate::error::{KompositError, describe_location};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;

/// A component definition together with the file that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    /// Parsed configuration entry.
    pub config: ComponentConfig,
    /// Defining file, when the definition came from disk.
    pub file: Option<Utf8PathBuf>,
}

impl ComponentDefinition {
    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Directory the component's paths are relative to: the directory of its
    /// defining file, or `project_dir` when there is none.
    #[must_use]
    pub fn root_dir(&self, project_dir: &Utf8Path) -> Utf8PathBuf {
        self.file
            .as_deref()
            .and_then(Utf8Path::parent)
            .unwrap_or(project_dir)
            .to_path_buf()
    }
}

/// Mapping from component name to its single definition.
///
/// Iteration follows first-definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDefinitionPool {
    definitions: IndexMap<String, ComponentDefinition>,
}

impl ComponentDefinitionPool {
    /// Collect the component definitions of every configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::DuplicateComponent`] naming both defining
    /// files when a name appears twice.
    pub fn build(configs: &[UserConfig]) -> Result<Self, KompositError> {
        let mut pool = Self::default();
        for config in configs {
            for component in &config.components {
                pool.insert(ComponentDefinition {
                    config: component.clone(),
                    file: config.file.clone(),
                })?;
            }
        }
        Ok(pool)
    }

    /// Add a definition, keeping the first one seen for a name.
    ///
    /// # Errors
    ///
    /// Returns [`KompositError::DuplicateComponent`] if the name is taken.
    pub fn insert(&mut self, definition: ComponentDefinition) -> Result<(), KompositError> {
        if let Some(existing) = self.definitions.get(definition.name()) {
            return Err(KompositError::DuplicateComponent {
                name: definition.name().to_owned(),
                first: describe_location(existing.file.as_deref()),
                second: describe_location(definition.file.as_deref()),
            });
        }
        self.definitions
            .insert(definition.name().to_owned(), definition);
        Ok(())
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(name)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the pool holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate over definitions in first-definition order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }
}

//! Component and variant domain model.
//!
//! Configuration entries become [`ComponentDefinition`]s in a
//! [`ComponentDefinitionPool`]; [`resolve_variant`] turns a variant's bill of
//! materials into a [`ResolvedVariant`] whose components are wired to their
//! subcomponents. [`ComponentAnalyzer`] walks that graph and the
//! [`ExecutionContext`] carries it through the pipeline.
//!
//! ```rust
//! use camino::Utf8Path;
//! use komposit::config::{ComponentConfig, UserConfig, VariantConfig};
//! use komposit::domain::{ComponentDefinitionPool, resolve_variant};
//!
//! let config = UserConfig {
//!     components: vec![ComponentConfig { name: "app".into(), ..Default::default() }],
//!     ..Default::default()
//! };
//! let pool = ComponentDefinitionPool::build(&[config]).expect("pool");
//! let variant = VariantConfig { name: "V".into(), bom: vec!["app".into()], config_file: None };
//! let resolved = resolve_variant(&variant, &pool, Utf8Path::new("/project")).expect("resolve");
//! assert_eq!(resolved.components().len(), 1);
//! ```

mod analyzer;
mod component;
mod context;
mod cycle;
mod pool;
mod resolve;

pub use analyzer::ComponentAnalyzer;
pub use component::{Component, ComponentId, ResolvedVariant};
pub use context::{ExecutionContext, UserRequest, UserRequestScope, UserRequestTarget};
pub use pool::{ComponentDefinition, ComponentDefinitionPool};
pub use resolve::resolve_variant;

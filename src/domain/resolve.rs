//! Variant resolution.
//!
//! Resolution runs in two phases so bom order never has to follow nesting
//! order: every bom entry is first materialised from the pool, then
//! subcomponent names are wired against that materialised set. A DFS over
//! the wired graph rejects cycles before anything walks it recursively.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::debug;

use super::component::{Component, ComponentId, ResolvedVariant};
use super::cycle;
use super::pool::{ComponentDefinition, ComponentDefinitionPool};
use crate::config::VariantConfig;
use crate::error::KompositError;

/// Resolve the components of `variant` against `pool`.
///
/// Components without a defining file are rooted at `project_dir`.
///
/// # Errors
///
/// Returns [`KompositError::EmptyVariant`] for an empty bom,
/// [`KompositError::ComponentNotFound`] for a bom entry missing from the pool,
/// [`KompositError::SubcomponentNotFound`] for a nested name that is not in
/// the bom, [`KompositError::ComponentCycle`] when nesting loops back on
/// itself and [`KompositError::InvalidSourcePattern`] for malformed globs.
pub fn resolve_variant(
    variant: &VariantConfig,
    pool: &ComponentDefinitionPool,
    project_dir: &Utf8Path,
) -> Result<ResolvedVariant, KompositError> {
    if variant.bom.is_empty() {
        return Err(KompositError::EmptyVariant {
            variant: variant.name.clone(),
        });
    }

    let (mut resolved, definitions) = flatten(variant, pool, project_dir)?;
    wire(&mut resolved, &definitions)?;

    if let Some(cycle) = cycle::find_cycle(&resolved) {
        return Err(KompositError::ComponentCycle {
            variant: variant.name.clone(),
            cycle,
        });
    }
    debug!(
        variant = %variant.name,
        components = resolved.components().len(),
        "resolved variant"
    );
    Ok(resolved)
}

fn flatten<'p>(
    variant: &VariantConfig,
    pool: &'p ComponentDefinitionPool,
    project_dir: &Utf8Path,
) -> Result<(ResolvedVariant, IndexMap<String, &'p ComponentDefinition>), KompositError> {
    let mut definitions: IndexMap<String, &ComponentDefinition> = IndexMap::new();
    let mut components = Vec::with_capacity(variant.bom.len());
    for name in &variant.bom {
        if definitions.contains_key(name) {
            debug!(component = %name, variant = %variant.name, "ignoring repeated bom entry");
            continue;
        }
        let definition = pool
            .get(name)
            .ok_or_else(|| KompositError::ComponentNotFound {
                name: name.clone(),
                variant: variant.name.clone(),
            })?;
        components.push(materialise(definition, project_dir)?);
        definitions.insert(name.clone(), definition);
    }
    Ok((
        ResolvedVariant::new(variant.name.clone(), components),
        definitions,
    ))
}

fn wire(
    resolved: &mut ResolvedVariant,
    definitions: &IndexMap<String, &ComponentDefinition>,
) -> Result<(), KompositError> {
    let mut edges = Vec::new();
    for (parent_idx, (parent, definition)) in definitions.iter().enumerate() {
        for child in &definition.config.components {
            let child_idx = definitions.get_index_of(child.as_str()).ok_or_else(|| {
                KompositError::SubcomponentNotFound {
                    name: child.clone(),
                    parent: parent.clone(),
                    variant: resolved.name().to_owned(),
                }
            })?;
            edges.push((ComponentId::new(parent_idx), ComponentId::new(child_idx)));
        }
    }

    let components = resolved.components_mut();
    for (parent, child) in edges {
        if let Some(component) = components.get_mut(parent.index()) {
            component.subcomponents.push(child);
        }
        if let Some(component) = components.get_mut(child.index()) {
            component.is_subcomponent = true;
        }
    }
    Ok(())
}

fn materialise(
    definition: &ComponentDefinition,
    project_dir: &Utf8Path,
) -> Result<Component, KompositError> {
    let root_dir = definition.root_dir(project_dir);
    let sources = resolve_patterns(&root_dir, definition.name(), &definition.config.sources)?;
    let test_sources =
        resolve_patterns(&root_dir, definition.name(), &definition.config.test_sources)?;
    Ok(Component {
        name: definition.name().to_owned(),
        root_dir,
        sources,
        test_sources,
        subcomponents: Vec::new(),
        is_subcomponent: false,
    })
}

/// Resolve source patterns relative to `root`.
///
/// Plain paths are joined verbatim since generated sources may not exist
/// yet. Patterns with glob metacharacters expand to the matching files,
/// sorted.
fn resolve_patterns(
    root: &Utf8Path,
    component: &str,
    patterns: &[String],
) -> Result<Vec<Utf8PathBuf>, KompositError> {
    let mut resolved = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let joined = root.join(pattern);
        if !is_glob(pattern) {
            resolved.push(joined);
            continue;
        }
        let entries =
            glob::glob(joined.as_str()).map_err(|e| KompositError::InvalidSourcePattern {
                component: component.to_owned(),
                pattern: pattern.clone(),
                reason: e.msg.to_owned(),
            })?;
        let mut matches: Vec<Utf8PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter_map(|path| Utf8PathBuf::from_path_buf(path).ok())
            .collect();
        matches.sort();
        if matches.is_empty() {
            debug!(component, pattern = %pattern, "source pattern matched no files");
        }
        resolved.extend(matches);
    }
    Ok(resolved)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentConfig, UserConfig};
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    fn component(name: &str, sources: &[&str], subs: &[&str]) -> ComponentConfig {
        ComponentConfig {
            name: name.to_owned(),
            sources: sources.iter().map(|s| (*s).to_owned()).collect(),
            test_sources: Vec::new(),
            components: subs.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    fn variant(name: &str, bom: &[&str]) -> VariantConfig {
        VariantConfig {
            name: name.to_owned(),
            bom: bom.iter().map(|s| (*s).to_owned()).collect(),
            config_file: None,
        }
    }

    fn pool_of(components: Vec<ComponentConfig>) -> ComponentDefinitionPool {
        let config = UserConfig {
            file: Some(Utf8PathBuf::from("/p/komposit.yaml")),
            components,
            ..UserConfig::default()
        };
        ComponentDefinitionPool::build(&[config]).expect("pool")
    }

    #[fixture]
    fn worked_pool() -> ComponentDefinitionPool {
        pool_of(vec![
            component("math", &["a.c"], &[]),
            component("app", &["main.c"], &["math"]),
        ])
    }

    #[rstest]
    fn wires_subcomponents_regardless_of_bom_order(worked_pool: ComponentDefinitionPool) {
        let resolved = resolve_variant(&variant("V", &["app", "math"]), &worked_pool, Utf8Path::new("/p"))
            .expect("resolve");
        let app = resolved.find("app").and_then(|id| resolved.get(id)).expect("app");
        let math_id = resolved.find("math").expect("math");
        assert_eq!(app.subcomponents, vec![math_id]);
        assert!(!app.is_subcomponent);
        assert!(resolved.get(math_id).expect("math").is_subcomponent);
        assert_eq!(app.sources, vec![Utf8PathBuf::from("/p/main.c")]);
    }

    #[rstest]
    fn empty_bom_fails(worked_pool: ComponentDefinitionPool) {
        let err = resolve_variant(&variant("V", &[]), &worked_pool, Utf8Path::new("/p"))
            .expect_err("empty bom");
        assert_eq!(err, KompositError::EmptyVariant { variant: "V".into() });
    }

    #[rstest]
    fn unknown_bom_entry_fails(worked_pool: ComponentDefinitionPool) {
        let err = resolve_variant(&variant("V", &["app", "gfx"]), &worked_pool, Utf8Path::new("/p"))
            .expect_err("missing component");
        assert_eq!(
            err,
            KompositError::ComponentNotFound {
                name: "gfx".into(),
                variant: "V".into(),
            }
        );
    }

    #[rstest]
    fn subcomponent_outside_bom_fails(worked_pool: ComponentDefinitionPool) {
        let err = resolve_variant(&variant("V", &["app"]), &worked_pool, Utf8Path::new("/p"))
            .expect_err("subcomponent outside bom");
        assert_eq!(
            err,
            KompositError::SubcomponentNotFound {
                name: "math".into(),
                parent: "app".into(),
                variant: "V".into(),
            }
        );
    }

    #[rstest]
    fn cycles_are_rejected() {
        let pool = pool_of(vec![
            component("a", &[], &["b"]),
            component("b", &[], &["c"]),
            component("c", &[], &["a"]),
        ]);
        let err = resolve_variant(&variant("V", &["c", "b", "a"]), &pool, Utf8Path::new("/p"))
            .expect_err("cycle");
        assert_eq!(
            err,
            KompositError::ComponentCycle {
                variant: "V".into(),
                cycle: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }
        );
    }

    #[rstest]
    fn repeated_bom_entries_materialise_once(worked_pool: ComponentDefinitionPool) {
        let resolved = resolve_variant(
            &variant("V", &["math", "app", "math"]),
            &worked_pool,
            Utf8Path::new("/p"),
        )
        .expect("resolve");
        assert_eq!(resolved.components().len(), 2);
    }

    #[rstest]
    fn glob_patterns_expand_sorted_files() {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        fs::create_dir_all(root.join("src/sub")).expect("dirs");
        for file in ["src/b.c", "src/a.c", "src/notes.txt"] {
            fs::write(root.join(file), "").expect("write");
        }
        let resolved = resolve_patterns(
            &root,
            "lib",
            &["src/*.c".to_owned(), "gen/out.c".to_owned()],
        )
        .expect("patterns");
        assert_eq!(
            resolved,
            vec![
                root.join("src/a.c"),
                root.join("src/b.c"),
                root.join("gen/out.c"),
            ]
        );
    }

    #[rstest]
    fn malformed_glob_is_reported() {
        let err = resolve_patterns(Utf8Path::new("/p"), "lib", &["src/[.c".to_owned()])
            .expect_err("bad pattern");
        assert!(matches!(err, KompositError::InvalidSourcePattern { .. }));
    }
}

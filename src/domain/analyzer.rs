//! Transitive source and include-directory collection.

use camino::Utf8PathBuf;
use indexmap::IndexSet;
use std::collections::HashSet;

use super::{Component, ComponentId, ResolvedVariant};

/// Walks components and their subcomponents depth first.
///
/// Each component is visited at most once. Results keep visit order and
/// drop repeated paths, since include order decides header precedence.
#[derive(Debug, Clone)]
pub struct ComponentAnalyzer<'a> {
    variant: &'a ResolvedVariant,
    roots: Vec<ComponentId>,
}

impl<'a> ComponentAnalyzer<'a> {
    /// Analyse the trees rooted at `roots`.
    pub fn new(variant: &'a ResolvedVariant, roots: impl IntoIterator<Item = ComponentId>) -> Self {
        Self {
            variant,
            roots: roots.into_iter().collect(),
        }
    }

    /// Analyse every component of the variant, in bom order.
    #[must_use]
    pub fn for_variant(variant: &'a ResolvedVariant) -> Self {
        Self::new(variant, variant.ids())
    }

    /// Own source paths of every visited component.
    #[must_use]
    pub fn collect_sources(&self) -> Vec<Utf8PathBuf> {
        self.collect(|c| c.sources.iter().cloned())
    }

    /// Own test source paths of every visited component.
    #[must_use]
    pub fn collect_test_sources(&self) -> Vec<Utf8PathBuf> {
        self.collect(|c| c.test_sources.iter().cloned())
    }

    /// Root directory of every visited component.
    #[must_use]
    pub fn collect_include_directories(&self) -> Vec<Utf8PathBuf> {
        self.collect(|c| std::iter::once(c.root_dir.clone()))
    }

    fn collect<I>(&self, paths: impl Fn(&'a Component) -> I) -> Vec<Utf8PathBuf>
    where
        I: Iterator<Item = Utf8PathBuf>,
    {
        let unique: IndexSet<Utf8PathBuf> = self.visit_order().into_iter().flat_map(paths).collect();
        unique.into_iter().collect()
    }

    fn visit_order(&self) -> Vec<&'a Component> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<ComponentId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(component) = self.variant.get(id) else {
                continue;
            };
            order.push(component);
            stack.extend(component.subcomponents.iter().rev().copied());
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComponentConfig, UserConfig, VariantConfig};
    use crate::domain::{ComponentDefinitionPool, resolve_variant};
    use camino::Utf8Path;
    use rstest::{fixture, rstest};

    fn definition(file: &str, name: &str, sources: &[&str], subs: &[&str]) -> UserConfig {
        UserConfig {
            file: Some(Utf8PathBuf::from(file)),
            components: vec![ComponentConfig {
                name: name.to_owned(),
                sources: sources.iter().map(|s| (*s).to_owned()).collect(),
                test_sources: vec![format!("test_{name}.cc")],
                components: subs.iter().map(|s| (*s).to_owned()).collect(),
            }],
            ..UserConfig::default()
        }
    }

    #[fixture]
    fn resolved() -> ResolvedVariant {
        let pool = ComponentDefinitionPool::build(&[
            definition("/p/math/komposit.yaml", "math", &["a.c", "/p/common/log.c"], &[]),
            definition("/p/util/komposit.yaml", "util", &["u.c", "/p/common/log.c"], &[]),
            definition("/p/app/komposit.yaml", "app", &["main.c"], &["math", "util"]),
        ])
        .expect("pool");
        let variant = VariantConfig {
            name: "V".into(),
            bom: vec!["app".into(), "math".into(), "util".into()],
            config_file: None,
        };
        resolve_variant(&variant, &pool, Utf8Path::new("/p")).expect("resolve")
    }

    #[rstest]
    fn sources_follow_depth_first_order(resolved: ResolvedVariant) {
        let app = resolved.find("app").expect("app");
        let sources = ComponentAnalyzer::new(&resolved, [app]).collect_sources();
        assert_eq!(
            sources,
            vec![
                Utf8PathBuf::from("/p/app/main.c"),
                Utf8PathBuf::from("/p/math/a.c"),
                Utf8PathBuf::from("/p/common/log.c"),
                Utf8PathBuf::from("/p/util/u.c"),
            ]
        );
    }

    #[rstest]
    fn include_directories_are_deduplicated(resolved: ResolvedVariant) {
        let dirs = ComponentAnalyzer::for_variant(&resolved).collect_include_directories();
        assert_eq!(
            dirs,
            vec![
                Utf8PathBuf::from("/p/app"),
                Utf8PathBuf::from("/p/math"),
                Utf8PathBuf::from("/p/util"),
            ]
        );
    }

    #[rstest]
    fn shared_subcomponent_is_visited_once(resolved: ResolvedVariant) {
        let app = resolved.find("app").expect("app");
        let math = resolved.find("math").expect("math");
        let tests = ComponentAnalyzer::new(&resolved, [math, app]).collect_test_sources();
        assert_eq!(
            tests,
            vec![
                Utf8PathBuf::from("/p/math/test_math.cc"),
                Utf8PathBuf::from("/p/app/test_app.cc"),
                Utf8PathBuf::from("/p/util/test_util.cc"),
            ]
        );
    }
}

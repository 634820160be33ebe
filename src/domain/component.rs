//! Resolved components of a single variant.

use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::HashSet;

/// Index of a component within its [`ResolvedVariant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(usize);

impl ComponentId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the component in bom order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A component materialised for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Directory containing the defining configuration file.
    pub root_dir: Utf8PathBuf,
    /// Resolved source paths.
    pub sources: Vec<Utf8PathBuf>,
    /// Resolved test source paths.
    pub test_sources: Vec<Utf8PathBuf>,
    /// Nested components, in declaration order.
    pub subcomponents: Vec<ComponentId>,
    /// Set when another component of the variant nests this one.
    pub is_subcomponent: bool,
}

/// The components of a variant, wired into an acyclic graph.
///
/// Components are stored in bom order and refer to their subcomponents by
/// [`ComponentId`]. Each variant owns its own copies; nothing is shared
/// between variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedVariant {
    name: String,
    components: Vec<Component>,
}

impl ResolvedVariant {
    pub(crate) const fn new(name: String, components: Vec<Component>) -> Self {
        Self { name, components }
    }

    /// Variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All components in bom order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component with the given id.
    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.index())
    }

    /// Id of the component with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .position(|c| c.name == name)
            .map(ComponentId::new)
    }

    /// Ids of all components in bom order.
    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + use<> {
        (0..self.components.len()).map(ComponentId::new)
    }

    /// Components listed directly by the bom and not nested anywhere.
    pub fn top_level(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_subcomponent)
            .map(|(idx, c)| (ComponentId::new(idx), c))
    }

    /// Direct subcomponents of `id`.
    pub fn subcomponents(&self, id: ComponentId) -> impl Iterator<Item = &Component> {
        self.get(id)
            .into_iter()
            .flat_map(|c| c.subcomponents.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Every component ordered so that subcomponents precede the components
    /// nesting them.
    ///
    /// Top-level components are expanded in bom order; anything not reachable
    /// from them follows in bom order as well.
    #[must_use]
    pub fn dependency_order(&self) -> Vec<ComponentId> {
        let mut order = Vec::with_capacity(self.components.len());
        let mut visited = HashSet::new();
        let roots = self
            .top_level()
            .map(|(id, _)| id)
            .chain(self.ids())
            .collect::<Vec<_>>();
        for root in roots {
            self.post_order(root, &mut visited, &mut order);
        }
        order
    }

    fn post_order(
        &self,
        id: ComponentId,
        visited: &mut HashSet<ComponentId>,
        order: &mut Vec<ComponentId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        if let Some(component) = self.get(id) {
            for child in &component.subcomponents {
                self.post_order(*child, visited, order);
            }
        }
        order.push(id);
    }

    pub(crate) fn components_mut(&mut self) -> &mut [Component] {
        &mut self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, subcomponents: &[usize], nested: bool) -> Component {
        Component {
            name: name.to_owned(),
            root_dir: Utf8PathBuf::from("/p"),
            sources: Vec::new(),
            test_sources: Vec::new(),
            subcomponents: subcomponents.iter().copied().map(ComponentId::new).collect(),
            is_subcomponent: nested,
        }
    }

    fn names(variant: &ResolvedVariant, ids: &[ComponentId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| variant.get(*id))
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn dependency_order_puts_children_first() {
        let variant = ResolvedVariant::new(
            "V".into(),
            vec![
                component("app", &[1], false),
                component("math", &[2], true),
                component("fmt", &[], true),
                component("tool", &[2], false),
            ],
        );
        let order = variant.dependency_order();
        assert_eq!(names(&variant, &order), vec!["fmt", "math", "app", "tool"]);
    }

    #[test]
    fn top_level_excludes_nested_components() {
        let variant = ResolvedVariant::new(
            "V".into(),
            vec![component("app", &[1], false), component("math", &[], true)],
        );
        let top: Vec<_> = variant.top_level().map(|(_, c)| c.name.as_str()).collect();
        assert_eq!(top, vec!["app"]);
        let nested: Vec<_> = variant
            .subcomponents(ComponentId::new(0))
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(nested, vec!["math"]);
        assert_eq!(variant.find("math"), Some(ComponentId::new(1)));
        assert_eq!(variant.find("nope"), None);
    }
}

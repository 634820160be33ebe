//! Cycle detection over the wired subcomponent graph.

use super::{ComponentId, ResolvedVariant};

/// DFS colour of a component.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Colour {
    Unseen,
    OnPath,
    Done,
}

/// Return the names along the first cycle found, rotated so the smallest
/// name comes first and is repeated at the end.
pub(super) fn find_cycle(variant: &ResolvedVariant) -> Option<Vec<String>> {
    let mut walk = SubcomponentWalk::new(variant);
    let cycle = variant.ids().find_map(|id| walk.enter(id))?;
    let names: Vec<String> = cycle
        .into_iter()
        .filter_map(|id| variant.get(id))
        .map(|c| c.name.clone())
        .collect();
    Some(close_at_smallest(names))
}

struct SubcomponentWalk<'a> {
    variant: &'a ResolvedVariant,
    colours: Vec<Colour>,
    path: Vec<ComponentId>,
}

impl<'a> SubcomponentWalk<'a> {
    fn new(variant: &'a ResolvedVariant) -> Self {
        Self {
            variant,
            colours: vec![Colour::Unseen; variant.components().len()],
            path: Vec::new(),
        }
    }

    fn colour(&self, id: ComponentId) -> Colour {
        self.colours.get(id.index()).copied().unwrap_or(Colour::Done)
    }

    fn paint(&mut self, id: ComponentId, colour: Colour) {
        if let Some(slot) = self.colours.get_mut(id.index()) {
            *slot = colour;
        }
    }

    /// Visit `id` and its subcomponents. Returns the open cycle path (without
    /// the closing repetition) when `id` reaches a component on the path.
    fn enter(&mut self, id: ComponentId) -> Option<Vec<ComponentId>> {
        match self.colour(id) {
            Colour::Done => return None,
            Colour::OnPath => {
                let start = self.path.iter().rposition(|on_path| *on_path == id)?;
                return self.path.get(start..).map(<[ComponentId]>::to_vec);
            }
            Colour::Unseen => {}
        }
        self.paint(id, Colour::OnPath);
        self.path.push(id);
        let variant = self.variant;
        let found = variant
            .get(id)
            .and_then(|component| component.subcomponents.iter().find_map(|sub| self.enter(*sub)));
        if found.is_none() {
            self.path.pop();
            self.paint(id, Colour::Done);
        }
        found
    }
}

/// Rotate an open cycle so its smallest name leads, then close it.
fn close_at_smallest(mut names: Vec<String>) -> Vec<String> {
    if let Some(start) = names
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(idx, _)| idx)
    {
        names.rotate_left(start);
    }
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names
}

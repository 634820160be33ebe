//! Requirement traceability side table.
//!
//! Implementation and test items are registered against requirement
//! identifiers with explicit calls. Item keys carry an `IMPL-` or `UTEST-`
//! prefix so both sides can live in one table.
//!
//! ```rust
//! use komposit::traceability::TraceabilityRegistry;
//!
//! let mut registry = TraceabilityRegistry::default();
//! registry.register_fulfills("domain::resolve_variant", &["REQ-RESOLVE"]);
//! registry.register_validates("resolve::cycles_are_rejected", &["REQ-RESOLVE"]);
//! assert_eq!(registry.items_for("REQ-RESOLVE").len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How an item relates to its requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceKind {
    /// The item implements the requirements.
    Fulfills,
    /// The item tests the requirements.
    Validates,
}

impl TraceKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Fulfills => "IMPL",
            Self::Validates => "UTEST",
        }
    }
}

/// Map of traced items to requirement identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceabilityRegistry {
    items: BTreeMap<String, BTreeSet<String>>,
}

impl TraceabilityRegistry {
    fn key(kind: TraceKind, item: &str) -> String {
        format!("{}-{item}", kind.prefix())
    }

    fn register(&mut self, kind: TraceKind, item: &str, requirements: &[&str]) {
        self.items
            .entry(Self::key(kind, item))
            .or_default()
            .extend(requirements.iter().map(|req| (*req).to_owned()));
    }

    /// Record that `item` implements `requirements`.
    pub fn register_fulfills(&mut self, item: &str, requirements: &[&str]) {
        self.register(TraceKind::Fulfills, item, requirements);
    }

    /// Record that the test `item` validates `requirements`.
    pub fn register_validates(&mut self, item: &str, requirements: &[&str]) {
        self.register(TraceKind::Validates, item, requirements);
    }

    /// Requirements registered for `item` under `kind`.
    #[must_use]
    pub fn requirements_for(&self, kind: TraceKind, item: &str) -> Option<&BTreeSet<String>> {
        self.items.get(&Self::key(kind, item))
    }

    /// Prefixed keys of every item traced to `requirement`, sorted.
    #[must_use]
    pub fn items_for(&self, requirement: &str) -> Vec<&str> {
        self.items
            .iter()
            .filter(|(_, reqs)| reqs.contains(requirement))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Number of traced items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over prefixed item keys and their requirements, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.items.iter().map(|(key, reqs)| (key.as_str(), reqs))
    }
}

impl fmt::Display for TraceabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (item, reqs) in self.iter() {
            let reqs: Vec<&str> = reqs.iter().map(String::as_str).collect();
            writeln!(f, "{item}: {}", reqs.join(", "))?;
        }
        Ok(())
    }
}

/// Registry covering the core operations of this crate.
#[must_use]
pub fn core_registry() -> TraceabilityRegistry {
    let mut registry = TraceabilityRegistry::default();
    registry.register_fulfills("domain::ComponentDefinitionPool::build", &["REQ-POOL"]);
    registry.register_fulfills("domain::resolve_variant", &["REQ-RESOLVE", "REQ-ACYCLIC"]);
    registry.register_fulfills("domain::ComponentAnalyzer", &["REQ-ANALYZE"]);
    registry.register_fulfills("pipeline::select_steps", &["REQ-SCHEDULE"]);
    registry.register_fulfills("pipeline::PipelineStepsExecutor::run", &["REQ-EXECUTE"]);
    registry.register_fulfills("pipeline::dirty_reason", &["REQ-EXECUTE"]);
    registry.register_fulfills("cmake_gen::generate", &["REQ-GENERATE"]);
    registry.register_validates("domain::resolve::tests::cycles_are_rejected", &["REQ-ACYCLIC"]);
    registry.register_validates(
        "pipeline::scheduler::tests::selects_expected_steps",
        &["REQ-SCHEDULE"],
    );
    registry.register_validates("cmake_gen_tests::worked_example_elements", &["REQ-GENERATE"]);
    registry
}

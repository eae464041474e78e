//! Transitive closure of a feature request.

use std::collections::{HashSet, VecDeque};

use tracing::{instrument, warn};

use crate::domain::{entities::Catalog, value_objects::FeatureId};

/// Outcome of resolving a request against a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    features: Vec<FeatureId>,
    unknown: Vec<FeatureId>,
}

impl Resolution {
    /// Resolved features in breadth-first discovery order.
    pub fn features(&self) -> &[FeatureId] {
        &self.features
    }

    /// Identifiers that were requested or required but are not in the
    /// catalog, each listed once in the order first encountered.
    pub fn unknown(&self) -> &[FeatureId] {
        &self.unknown
    }

    pub fn contains(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.as_str() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in fold order: prerequisites before their dependents.
    pub fn fold_order(&self) -> impl Iterator<Item = &FeatureId> {
        self.features.iter().rev()
    }
}

/// Resolve `requested` into its prerequisite closure.
///
/// Breadth-first over prerequisite edges. Unknown ids are skipped with a
/// warning and never abort resolution. Cycles terminate on the membership
/// check.
#[instrument(skip_all, fields(requested = requested.len()))]
pub fn resolve(requested: &[FeatureId], catalog: &Catalog) -> Resolution {
    let mut queue: VecDeque<&FeatureId> = requested.iter().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unknown_seen: HashSet<&str> = HashSet::new();
    let mut resolution = Resolution::default();

    while let Some(id) = queue.pop_front() {
        if seen.contains(id.as_str()) {
            continue;
        }

        let Some(feature) = catalog.feature(id.as_str()) else {
            if unknown_seen.insert(id.as_str()) {
                warn!(feature = %id, "Unknown feature, skipping");
                resolution.unknown.push(id.clone());
            }
            continue;
        };

        seen.insert(id.as_str());
        resolution.features.push(id.clone());
        queue.extend(feature.prerequisites());
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Feature;

    fn ids(names: &[&str]) -> Vec<FeatureId> {
        names.iter().map(|n| FeatureId::new(*n)).collect()
    }

    fn catalog() -> Catalog {
        Catalog::builder()
            .feature(Feature::builder("git").build())
            .feature(Feature::builder("npm").requires("git").build())
            .feature(Feature::builder("ts").requires("npm").build())
            .feature(Feature::builder("node").requires("ts").build())
            .feature(Feature::builder("vite").requires("ts").build())
            .feature(Feature::builder("react").requires("ts").build())
            .feature(
                Feature::builder("vite-react")
                    .requires("vite")
                    .requires("react")
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_breadth_first() {
        let resolution = resolve(&ids(&["vite-react"]), &catalog());
        assert_eq!(
            resolution.features(),
            ids(&["vite-react", "vite", "react", "ts", "npm", "git"])
        );
        assert!(resolution.unknown().is_empty());
    }

    #[test]
    fn fold_order_is_reverse_discovery() {
        let resolution = resolve(&ids(&["ts"]), &catalog());
        let order: Vec<_> = resolution.fold_order().map(FeatureId::as_str).collect();
        assert_eq!(order, ["git", "npm", "ts"]);
    }

    #[test]
    fn duplicates_appear_once() {
        let resolution = resolve(&ids(&["node", "ts", "node", "git"]), &catalog());
        assert_eq!(resolution.features(), ids(&["node", "ts", "git", "npm"]));
    }

    #[test]
    fn unknown_features_are_reported_once() {
        let catalog = Catalog::builder()
            .feature(Feature::builder("a").requires("ghost").build())
            .build()
            .unwrap();
        let resolution = resolve(&ids(&["ghost", "a", "ghost"]), &catalog);
        assert_eq!(resolution.features(), ids(&["a"]));
        assert_eq!(resolution.unknown(), ids(&["ghost"]));
    }

    #[test]
    fn cycles_terminate() {
        let catalog = Catalog::builder()
            .feature(Feature::builder("a").requires("b").build())
            .feature(Feature::builder("b").requires("a").build())
            .build()
            .unwrap();
        let resolution = resolve(&ids(&["a"]), &catalog);
        assert_eq!(resolution.features(), ids(&["a", "b"]));
    }

    #[test]
    fn closure_is_complete_and_exact() {
        let catalog = catalog();
        let resolution = resolve(&ids(&["node"]), &catalog);
        let mut got: Vec<_> = resolution.features().iter().map(FeatureId::as_str).collect();
        got.sort_unstable();
        assert_eq!(got, ["git", "node", "npm", "ts"]);
        assert!(!resolution.contains("vite"));
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = catalog();
        let first = resolve(&ids(&["vite-react", "node"]), &catalog);
        let second = resolve(first.features(), &catalog);

        let as_set = |r: &Resolution| -> HashSet<String> {
            r.features().iter().map(|f| f.to_string()).collect()
        };
        assert_eq!(as_set(&first), as_set(&second));
    }

    #[test]
    fn empty_request_resolves_to_nothing() {
        let resolution = resolve(&[], &catalog());
        assert!(resolution.is_empty());
    }
}

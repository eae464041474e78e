//! Compiler configuration selection.

use crate::domain::{
    entities::Catalog, resolver::Resolution, value_objects::ConfigSelectionPolicy,
};

/// Pick at most one compiler configuration for a resolution.
///
/// An explicit override always wins. Otherwise:
/// - [`ConfigSelectionPolicy::Priority`] returns the last entry of the
///   catalog's priority list that is present in the resolution;
/// - [`ConfigSelectionPolicy::LastFeatureWins`] walks the resolved features
///   in order and keeps the last selector declared.
pub fn select_config(
    resolution: &Resolution,
    catalog: &Catalog,
    explicit: Option<&str>,
    policy: ConfigSelectionPolicy,
) -> Option<String> {
    if let Some(id) = explicit.filter(|id| !id.trim().is_empty()) {
        return Some(id.to_string());
    }

    match policy {
        ConfigSelectionPolicy::Priority => catalog
            .config_priority()
            .iter()
            .rev()
            .find(|entry| resolution.contains(entry))
            .cloned(),
        ConfigSelectionPolicy::LastFeatureWins => resolution
            .features()
            .iter()
            .filter_map(|id| catalog.feature(id.as_str()))
            .filter_map(|feature| feature.config_selector())
            .last()
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{entities::Feature, resolver::resolve, value_objects::FeatureId};

    fn catalog() -> Catalog {
        Catalog::builder()
            .feature(Feature::builder("npm").build())
            .feature(
                Feature::builder("ts")
                    .requires("npm")
                    .compiler_config("ts")
                    .build(),
            )
            .feature(
                Feature::builder("react")
                    .requires("ts")
                    .compiler_config("react")
                    .build(),
            )
            .feature(
                Feature::builder("node")
                    .requires("ts")
                    .compiler_config("node")
                    .build(),
            )
            .build()
            .unwrap()
    }

    fn resolved(names: &[&str]) -> Resolution {
        let request: Vec<_> = names.iter().map(|n| FeatureId::new(*n)).collect();
        resolve(&request, &catalog())
    }

    #[test]
    fn explicit_override_wins() {
        let resolution = resolved(&["react"]);
        let picked = select_config(&resolution, &catalog(), Some("custom"), Default::default());
        assert_eq!(picked.as_deref(), Some("custom"));
    }

    #[test]
    fn priority_picks_last_present_entry() {
        // react sits after node in the priority list.
        let resolution = resolved(&["react", "node"]);
        let picked = select_config(&resolution, &catalog(), None, ConfigSelectionPolicy::Priority);
        assert_eq!(picked.as_deref(), Some("react"));
    }

    #[test]
    fn last_feature_wins_follows_resolution_order() {
        // Discovery order: react, node, ts, npm; ts declares the last selector.
        let resolution = resolved(&["react", "node"]);
        let picked = select_config(
            &resolution,
            &catalog(),
            None,
            ConfigSelectionPolicy::LastFeatureWins,
        );
        assert_eq!(picked.as_deref(), Some("ts"));
    }

    #[test]
    fn nothing_selected_without_matching_features() {
        let resolution = resolved(&["npm"]);
        for policy in [
            ConfigSelectionPolicy::Priority,
            ConfigSelectionPolicy::LastFeatureWins,
        ] {
            assert_eq!(select_config(&resolution, &catalog(), None, policy), None);
        }
    }

    #[test]
    fn blank_override_is_ignored() {
        let resolution = resolved(&["ts"]);
        let picked = select_config(&resolution, &catalog(), Some("  "), Default::default());
        assert_eq!(picked.as_deref(), Some("ts"));
    }
}

//! Fragment folding and manifest reconciliation.
//!
//! Two distinct merges live here:
//!
//! - [`merge`] folds the fragments of a resolution into a fresh
//!   [`ManifestBuilder`], then applies descriptor overrides.
//! - [`deep_merge`] / [`reconcile`] combine an already generated manifest
//!   with one found on disk.

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::domain::{
    entities::{
        Catalog, IgnorePatternSet, ManifestBuilder, ManifestDocument, ProjectDescriptor,
        manifest::json_kind,
    },
    error::DomainError,
    resolver::Resolution,
    value_objects::MergeDirection,
};

/// Field whose generated value wins regardless of merge direction.
const IDENTITY_KEY: &str = "name";

/// Result of folding a resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub manifest: ManifestDocument,
    /// Ignore modules in first-insertion order.
    pub ignore_modules: Vec<String>,
}

// ── Fragment fold ────────────────────────────────────────────────────────────

/// Fold the catalog base and every resolved feature, then apply descriptor
/// overrides.
///
/// Features fold in reverse discovery order so prerequisites are applied
/// before the features that require them.
#[instrument(skip_all, fields(features = resolution.features().len()))]
pub fn merge(
    resolution: &Resolution,
    catalog: &Catalog,
    descriptor: &ProjectDescriptor,
) -> MergeOutcome {
    let mut builder = ManifestBuilder::new();

    for fragment in catalog.base() {
        builder.apply(fragment);
    }

    for id in resolution.fold_order() {
        // Resolution only yields catalog members.
        let Some(feature) = catalog.feature(id.as_str()) else {
            continue;
        };
        debug!(feature = %id, fragments = feature.fragments().len(), "Folding feature");
        for fragment in feature.fragments() {
            builder.apply(fragment);
        }
    }

    builder.apply_overrides(descriptor);

    let (manifest, ignore_modules) = builder.finish();
    MergeOutcome {
        manifest,
        ignore_modules,
    }
}

/// Combine an externally produced manifest with descriptor overrides.
///
/// Used when fragments come from the evaluator rather than the catalog.
pub fn apply_overrides_to(
    generated: Value,
    descriptor: &ProjectDescriptor,
) -> Result<ManifestDocument, DomainError> {
    let mut builder = ManifestBuilder::from_document(generated)?;
    builder.apply_overrides(descriptor);
    Ok(builder.finish().0)
}

/// Concatenate the lines of each accumulated ignore module.
///
/// A module the catalog does not define is skipped with a warning.
pub fn render_ignore(modules: &[String], catalog: &Catalog) -> IgnorePatternSet {
    let mut lines = Vec::new();
    for module in modules {
        match catalog.ignore_module(module) {
            Some(patterns) => lines.extend(patterns.iter().cloned()),
            None => warn!(module = %module, "Ignore module not defined in catalog, skipping"),
        }
    }
    IgnorePatternSet::new(lines)
}

// ── Reconciliation ───────────────────────────────────────────────────────────

/// Deep-merge two JSON values.
///
/// - Objects recurse. Keys of `generated` come first in their order,
///   followed by keys only present in `existing`.
/// - Arrays concatenate: generated entries, then existing entries not
///   already present.
/// - Any other conflict is settled by `direction`.
pub fn deep_merge(generated: &Value, existing: &Value, direction: MergeDirection) -> Value {
    match (generated, existing) {
        (Value::Object(ours), Value::Object(theirs)) => {
            Value::Object(merge_objects(ours, theirs, direction))
        }
        (Value::Array(ours), Value::Array(theirs)) => {
            let mut merged = ours.clone();
            for item in theirs {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Value::Array(merged)
        }
        _ => match direction {
            MergeDirection::GeneratedWins => generated.clone(),
            MergeDirection::ExistingWins => existing.clone(),
        },
    }
}

fn merge_objects(
    ours: &Map<String, Value>,
    theirs: &Map<String, Value>,
    direction: MergeDirection,
) -> Map<String, Value> {
    let mut merged = Map::with_capacity(ours.len().max(theirs.len()));
    for (key, value) in ours {
        let value = match theirs.get(key) {
            Some(other) => deep_merge(value, other, direction),
            None => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    for (key, value) in theirs {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Reconcile a generated manifest with the one already on disk.
///
/// The generated `name` always survives, and the result keeps the manifest
/// emission order.
pub fn reconcile(
    generated: &ManifestDocument,
    existing: &Value,
    direction: MergeDirection,
) -> Result<ManifestDocument, DomainError> {
    let Value::Object(existing_map) = existing else {
        return Err(DomainError::InvalidManifest(format!(
            "existing manifest is {}, expected an object",
            json_kind(existing)
        )));
    };

    let mut merged = merge_objects(generated.as_map(), existing_map, direction);
    if let Some(name) = generated.get(IDENTITY_KEY) {
        merged.insert(IDENTITY_KEY.to_string(), name.clone());
    }
    Ok(ManifestDocument::new(merged))
}

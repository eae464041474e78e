//! The feature catalog: every known feature, preset and ignore module.
//!
//! A [`Catalog`] is built once per invocation and never mutated afterwards;
//! all accessors borrow. Construction goes through [`CatalogBuilder`], which
//! enforces the structural rules (unique ids, non-empty presets, an existing
//! default preset).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::domain::{
    entities::feature::{Feature, Fragment},
    error::DomainError,
    value_objects::FeatureId,
};

/// Priority list used when the catalog does not declare one.
pub const DEFAULT_CONFIG_PRIORITY: &[&str] = &["ts", "node", "vite", "react"];

/// Prefix used for compiler configuration references when the catalog does
/// not declare one.
pub const DEFAULT_COMPILER_CONFIG_BASE: &str = "@cuecfg/config/ts";

/// Preset applied by `init` when the catalog does not declare one.
pub const DEFAULT_PRESET: &str = "lib";

/// Immutable lookup table of features and presets.
#[derive(Debug, Clone)]
pub struct Catalog {
    features: HashMap<FeatureId, Feature>,
    presets: BTreeMap<String, Vec<FeatureId>>,
    base: Vec<Fragment>,
    ignore_modules: HashMap<String, Vec<String>>,
    config_priority: Vec<String>,
    compiler_config_base: String,
    default_preset: String,
    root: Option<PathBuf>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.features.contains_key(id)
    }

    /// All feature ids, sorted.
    pub fn feature_ids(&self) -> Vec<&FeatureId> {
        let mut ids: Vec<_> = self.features.keys().collect();
        ids.sort();
        ids
    }

    /// All features, sorted by id.
    pub fn features(&self) -> Vec<&Feature> {
        self.feature_ids()
            .into_iter()
            .filter_map(|id| self.features.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn preset(&self, name: &str) -> Option<&[FeatureId]> {
        self.presets.get(name).map(Vec::as_slice)
    }

    /// Look up a preset, producing a user-facing error when it is missing.
    pub fn require_preset(&self, name: &str) -> Result<&[FeatureId], DomainError> {
        self.preset(name).ok_or_else(|| DomainError::UnknownPreset {
            name: name.into(),
            available: self.preset_names().into_iter().map(String::from).collect(),
        })
    }

    /// Look up a feature, producing a user-facing error when it is missing.
    pub fn require_feature(&self, id: &str) -> Result<&Feature, DomainError> {
        self.feature(id).ok_or_else(|| DomainError::UnknownFeature {
            id: id.into(),
            available: self.available_features(),
        })
    }

    /// Preset names, sorted.
    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn presets(&self) -> impl Iterator<Item = (&str, &[FeatureId])> {
        self.presets
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn default_preset(&self) -> &str {
        &self.default_preset
    }

    /// Fragments folded before any feature.
    pub fn base(&self) -> &[Fragment] {
        &self.base
    }

    pub fn ignore_module(&self, id: &str) -> Option<&[String]> {
        self.ignore_modules.get(id).map(Vec::as_slice)
    }

    /// Fixed priority list for compiler-config selection, lowest first.
    pub fn config_priority(&self) -> &[String] {
        &self.config_priority
    }

    pub fn compiler_config_base(&self) -> &str {
        &self.compiler_config_base
    }

    /// Directory the catalog was loaded from, if it came from disk.
    ///
    /// Evaluator sources and the auxiliary schema directory live here.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn available_features(&self) -> Vec<String> {
        self.feature_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }
}

/// Builder for [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    features: Vec<Feature>,
    presets: BTreeMap<String, Vec<FeatureId>>,
    base: Vec<Fragment>,
    ignore_modules: HashMap<String, Vec<String>>,
    config_priority: Option<Vec<String>>,
    compiler_config_base: Option<String>,
    default_preset: Option<String>,
    root: Option<PathBuf>,
}

impl CatalogBuilder {
    pub fn feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn preset<I, S>(mut self, name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FeatureId>,
    {
        self.presets
            .insert(name.into(), ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn base(mut self, fragments: Vec<Fragment>) -> Self {
        self.base = fragments;
        self
    }

    pub fn ignore_module<I, S>(mut self, id: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_modules
            .insert(id.into(), lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn config_priority<I, S>(mut self, priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_priority = Some(priority.into_iter().map(Into::into).collect());
        self
    }

    pub fn compiler_config_base(mut self, base: impl Into<String>) -> Self {
        self.compiler_config_base = Some(base.into());
        self
    }

    pub fn default_preset(mut self, name: impl Into<String>) -> Self {
        self.default_preset = Some(name.into());
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Validate and build the catalog.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidFeatureId`] for an empty or whitespace id.
    /// - [`DomainError::DuplicateFeature`] when two features share an id.
    /// - [`DomainError::InvalidCatalog`] for an empty preset, or a declared
    ///   default preset that does not exist.
    pub fn build(self) -> Result<Catalog, DomainError> {
        let mut features = HashMap::with_capacity(self.features.len());
        for feature in self.features {
            FeatureId::parse(feature.id().as_str())?;
            let id = feature.id().clone();
            if features.insert(id.clone(), feature).is_some() {
                return Err(DomainError::DuplicateFeature { id: id.to_string() });
            }
        }

        for (name, ids) in &self.presets {
            if ids.is_empty() {
                return Err(DomainError::InvalidCatalog(format!(
                    "preset '{name}' lists no features"
                )));
            }
        }

        let default_preset = match self.default_preset {
            Some(name) if !self.presets.contains_key(&name) => {
                return Err(DomainError::InvalidCatalog(format!(
                    "default preset '{name}' is not defined"
                )));
            }
            Some(name) => name,
            None => DEFAULT_PRESET.to_string(),
        };

        Ok(Catalog {
            features,
            presets: self.presets,
            base: self.base,
            ignore_modules: self.ignore_modules,
            config_priority: self.config_priority.unwrap_or_else(|| {
                DEFAULT_CONFIG_PRIORITY
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            compiler_config_base: self
                .compiler_config_base
                .unwrap_or_else(|| DEFAULT_COMPILER_CONFIG_BASE.to_string()),
            default_preset,
            root: self.root,
        })
    }
}

//! The user-authored project descriptor.
//!
//! Names the requested features plus optional metadata and verbatim manifest
//! overrides. Persistence format is an adapter concern; this type only
//! models the content.

use serde_json::{Map, Value};

use crate::domain::value_objects::FeatureId;

/// Optional package metadata supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
}

impl ProjectMetadata {
    /// Metadata as `(manifest key, value)` pairs, in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("name", self.name.as_deref()),
            ("version", self.version.as_deref()),
            ("description", self.description.as_deref()),
            ("license", self.license.as_deref()),
            ("author", self.author.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Requested features plus project-level overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDescriptor {
    features: Vec<FeatureId>,
    metadata: ProjectMetadata,
    overrides: Map<String, Value>,
    compiler_config: Option<String>,
}

impl ProjectDescriptor {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FeatureId>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: ProjectMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_overrides(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_compiler_config(mut self, id: impl Into<String>) -> Self {
        self.compiler_config = Some(id.into());
        self
    }

    /// Requested features, in the order the user listed them.
    pub fn features(&self) -> &[FeatureId] {
        &self.features
    }

    pub fn contains(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.as_str() == id)
    }

    /// Append a feature. Returns `false` if it was already requested.
    pub fn add(&mut self, id: FeatureId) -> bool {
        if self.contains(id.as_str()) {
            return false;
        }
        self.features.push(id);
        true
    }

    /// Remove the first occurrence of a feature. Returns `false` if absent.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.features.iter().position(|f| f.as_str() == id) {
            Some(index) => {
                self.features.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Verbatim top-level manifest overrides.
    pub fn overrides(&self) -> &Map<String, Value> {
        &self.overrides
    }

    /// Explicit compiler configuration; wins over any selection policy.
    pub fn compiler_config(&self) -> Option<&str> {
        self.compiler_config.as_deref()
    }
}

//! Features and the fragments they contribute.
//!
//! A [`Feature`] is a named, composable unit of project configuration. It
//! declares its direct prerequisites and an ordered list of [`Fragment`]s.
//! Fragments are applied to the manifest builder during the merge fold, in
//! the order the feature declares them.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::value_objects::{DependencyKind, FeatureId};

/// A partial contribution attached to a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Top-level manifest fields assigned verbatim (shallow, last write wins).
    Fields(Map<String, Value>),
    /// Dependency name → version range, merged key-by-key into one table.
    Dependencies {
        kind: DependencyKind,
        entries: BTreeMap<String, String>,
    },
    /// Script name → command, merged key-by-key; declaration order is kept.
    Scripts(Vec<(String, String)>),
    /// Ignore-pattern module identifiers.
    IgnoreModules(Vec<String>),
    /// Compiler configuration selector.
    CompilerConfig(String),
}

impl Fragment {
    /// `true` if applying this fragment would change nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fields(map) => map.is_empty(),
            Self::Dependencies { entries, .. } => entries.is_empty(),
            Self::Scripts(scripts) => scripts.is_empty(),
            Self::IgnoreModules(modules) => modules.is_empty(),
            Self::CompilerConfig(id) => id.is_empty(),
        }
    }
}

/// A named unit of configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    prerequisites: Vec<FeatureId>,
    fragments: Vec<Fragment>,
    auxiliary_schema: bool,
}

impl Feature {
    /// Start building a feature.
    pub fn builder(id: impl Into<FeatureId>) -> FeatureBuilder {
        FeatureBuilder::new(id)
    }

    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// Direct prerequisites in declaration order.
    pub fn prerequisites(&self) -> &[FeatureId] {
        &self.prerequisites
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The compiler configuration this feature selects, if any.
    ///
    /// When a feature declares several selectors the last one counts.
    pub fn config_selector(&self) -> Option<&str> {
        self.fragments.iter().rev().find_map(|f| match f {
            Fragment::CompilerConfig(id) => Some(id.as_str()),
            _ => None,
        })
    }

    /// Whether generating this feature needs the auxiliary schema directory
    /// linked into the project.
    pub fn requires_auxiliary_schema(&self) -> bool {
        self.auxiliary_schema
    }
}

/// Builder for [`Feature`].
///
/// Contributions of the same kind are gathered into a single fragment; the
/// built feature lists its fragments in a fixed order: fields, dev
/// dependencies, peer dependencies, scripts, ignore modules, compiler config.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    id: FeatureId,
    prerequisites: Vec<FeatureId>,
    fields: Map<String, Value>,
    dev: BTreeMap<String, String>,
    peer: BTreeMap<String, String>,
    scripts: Vec<(String, String)>,
    ignore: Vec<String>,
    compiler_config: Option<String>,
    auxiliary_schema: bool,
}

impl FeatureBuilder {
    pub fn new(id: impl Into<FeatureId>) -> Self {
        Self {
            id: id.into(),
            prerequisites: Vec::new(),
            fields: Map::new(),
            dev: BTreeMap::new(),
            peer: BTreeMap::new(),
            scripts: Vec::new(),
            ignore: Vec::new(),
            compiler_config: None,
            auxiliary_schema: false,
        }
    }

    /// Declare a direct prerequisite.
    pub fn requires(mut self, id: impl Into<FeatureId>) -> Self {
        self.prerequisites.push(id.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn dependency(
        mut self,
        kind: DependencyKind,
        name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        let table = match kind {
            DependencyKind::Dev => &mut self.dev,
            DependencyKind::Peer => &mut self.peer,
        };
        table.insert(name.into(), range.into());
        self
    }

    pub fn dev_dependency(self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependency(DependencyKind::Dev, name, range)
    }

    pub fn peer_dependency(self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependency(DependencyKind::Peer, name, range)
    }

    /// Add a script; redefining a name replaces the command in place.
    pub fn script(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        let name = name.into();
        let command = command.into();
        match self.scripts.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = command,
            None => self.scripts.push((name, command)),
        }
        self
    }

    pub fn ignore(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        if !self.ignore.contains(&module) {
            self.ignore.push(module);
        }
        self
    }

    pub fn compiler_config(mut self, id: impl Into<String>) -> Self {
        self.compiler_config = Some(id.into());
        self
    }

    pub fn auxiliary_schema(mut self, required: bool) -> Self {
        self.auxiliary_schema = required;
        self
    }

    pub fn build(self) -> Feature {
        let candidates = [
            Fragment::Fields(self.fields),
            Fragment::Dependencies {
                kind: DependencyKind::Dev,
                entries: self.dev,
            },
            Fragment::Dependencies {
                kind: DependencyKind::Peer,
                entries: self.peer,
            },
            Fragment::Scripts(self.scripts),
            Fragment::IgnoreModules(self.ignore),
        ];

        let mut fragments: Vec<Fragment> =
            candidates.into_iter().filter(|f| !f.is_empty()).collect();
        if let Some(id) = self.compiler_config.filter(|id| !id.is_empty()) {
            fragments.push(Fragment::CompilerConfig(id));
        }

        Feature {
            id: self.id,
            prerequisites: self.prerequisites,
            fragments,
            auxiliary_schema: self.auxiliary_schema,
        }
    }
}

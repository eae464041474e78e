//! Output documents and the builder that accumulates the manifest.
//!
//! [`ManifestBuilder`] is the mutable accumulator threaded through the merge
//! fold. It owns a single ordered JSON object; every manipulation goes
//! through it so the final key order reflects the order in which keys were
//! first touched. [`ManifestBuilder::finish`] applies the emission rules
//! (schema key first, sorted dependency tables).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{
    entities::{descriptor::ProjectDescriptor, feature::Fragment},
    error::DomainError,
    value_objects::DependencyKind,
};

/// Schema reference always emitted as the first manifest key.
pub const PACKAGE_SCHEMA: &str = "https://json.schemastore.org/package";

/// Schema reference of the compiler configuration document.
pub const TSCONFIG_SCHEMA: &str = "https://json.schemastore.org/tsconfig";

const SCHEMA_KEY: &str = "$schema";
const SCRIPTS_KEY: &str = "scripts";

/// Tables whose keys are sorted on emission.
const SORTED_TABLES: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

// ── ManifestDocument ─────────────────────────────────────────────────────────

/// A finished package manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManifestDocument(Map<String, Value>);

impl ManifestDocument {
    /// Wrap a JSON object, applying the emission key order.
    pub fn new(document: Map<String, Value>) -> Self {
        Self(order_document(document))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Top-level keys in emission order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Pretty JSON (two-space indent) with a trailing newline.
    pub fn render(&self) -> String {
        render_json(&self.0)
    }
}

// ── CompilerConfigReference ──────────────────────────────────────────────────

/// The selected compiler configuration, rendered as a document that extends
/// a shared base configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfigReference {
    id: String,
    extends: String,
}

impl CompilerConfigReference {
    pub fn new(id: impl Into<String>, base: &str) -> Self {
        let id = id.into();
        let extends = format!("{}/{}.json", base.trim_end_matches('/'), id);
        Self { id, extends }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn extends(&self) -> &str {
        &self.extends
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(SCHEMA_KEY.into(), Value::String(TSCONFIG_SCHEMA.into()));
        map.insert("extends".into(), Value::String(self.extends.clone()));
        Value::Object(map)
    }

    pub fn render(&self) -> String {
        render_json(&self.to_value())
    }
}

// ── IgnorePatternSet ─────────────────────────────────────────────────────────

/// Ordered ignore-file lines.
///
/// De-duplication happens per source module, never per line: two modules
/// may legitimately repeat a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnorePatternSet {
    lines: Vec<String>,
}

impl IgnorePatternSet {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined with `\n`, plus a trailing newline.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

// ── ManifestBuilder ──────────────────────────────────────────────────────────

/// Mutable accumulator for the manifest and the ignore-module set.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    document: Map<String, Value>,
    ignore_modules: Vec<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a document produced elsewhere (e.g. by the evaluator).
    pub fn from_document(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(document) => Ok(Self {
                document,
                ignore_modules: Vec::new(),
            }),
            other => Err(DomainError::InvalidManifest(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Apply one feature fragment.
    ///
    /// Compiler-config selectors are ignored here; selection is a separate
    /// policy over the whole resolution.
    pub fn apply(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::Fields(fields) => self.set_fields(fields),
            Fragment::Dependencies { kind, entries } => self.merge_dependencies(*kind, entries),
            Fragment::Scripts(scripts) => self.merge_scripts(
                scripts
                    .iter()
                    .map(|(name, command)| (name.as_str(), Value::String(command.clone()))),
            ),
            Fragment::IgnoreModules(modules) => {
                for module in modules {
                    self.add_ignore_module(module);
                }
            }
            Fragment::CompilerConfig(_) => {}
        }
    }

    /// Shallow assignment; later writes replace earlier ones key-for-key.
    pub fn set_fields(&mut self, fields: &Map<String, Value>) {
        for (key, value) in fields {
            self.document.insert(key.clone(), value.clone());
        }
    }

    /// Merge entries into a dependency table; later ranges replace earlier
    /// ones for the same dependency name.
    pub fn merge_dependencies(&mut self, kind: DependencyKind, entries: &BTreeMap<String, String>) {
        self.with_table(kind.table_key(), |table| {
            for (name, range) in entries {
                table.insert(name.clone(), Value::String(range.clone()));
            }
        });
    }

    /// Merge scripts key-by-key; a redefined script keeps its position.
    pub fn merge_scripts<'a, I>(&mut self, scripts: I)
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        self.with_table(SCRIPTS_KEY, |table| {
            for (name, command) in scripts {
                table.insert(name.to_string(), command);
            }
        });
    }

    /// Record an ignore module; re-adding a present module is a no-op.
    pub fn add_ignore_module(&mut self, module: &str) {
        if !self.ignore_modules.iter().any(|m| m == module) {
            self.ignore_modules.push(module.to_string());
        }
    }

    /// Apply descriptor metadata and overrides.
    ///
    /// Everything overwrites outright except `scripts`, which is merged
    /// key-by-key on top of the scripts accumulated so far.
    pub fn apply_overrides(&mut self, descriptor: &ProjectDescriptor) {
        for (key, value) in descriptor.metadata().entries() {
            self.document
                .insert(key.to_string(), Value::String(value.to_string()));
        }

        for (key, value) in descriptor.overrides() {
            match (key.as_str(), value) {
                (SCRIPTS_KEY, Value::Object(scripts)) => {
                    self.merge_scripts(scripts.iter().map(|(k, v)| (k.as_str(), v.clone())))
                }
                _ => {
                    self.document.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Ignore modules in first-insertion order.
    pub fn ignore_modules(&self) -> &[String] {
        &self.ignore_modules
    }

    /// Produce the final document.
    pub fn finish(self) -> (ManifestDocument, Vec<String>) {
        (ManifestDocument::new(self.document), self.ignore_modules)
    }

    /// Run `f` on an object-valued top-level table, creating it if absent.
    ///
    /// A non-object value under the key is replaced by the table `f` fills.
    fn with_table(&mut self, key: &str, f: impl FnOnce(&mut Map<String, Value>)) {
        let slot = self
            .document
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match slot {
            Value::Object(table) => f(table),
            other => {
                let mut table = Map::new();
                f(&mut table);
                *other = Value::Object(table);
            }
        }
    }
}

/// Apply the emission rules to a document: `$schema` first, dependency
/// tables sorted, every other key in its existing position.
pub fn order_document(document: Map<String, Value>) -> Map<String, Value> {
    let mut ordered = Map::with_capacity(document.len() + 1);
    ordered.insert(SCHEMA_KEY.into(), Value::String(PACKAGE_SCHEMA.into()));

    for (key, value) in document {
        if key == SCHEMA_KEY {
            continue;
        }
        let value = match value {
            Value::Object(table) if SORTED_TABLES.contains(&key.as_str()) => {
                Value::Object(sort_keys(table))
            }
            other => other,
        };
        ordered.insert(key, value);
    }

    ordered
}

fn sort_keys(table: Map<String, Value>) -> Map<String, Value> {
    table
        .into_iter()
        .collect::<BTreeMap<_, _>>()
        .into_iter()
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    // Serializing a `serde_json::Value`/`Map` cannot fail: keys are strings.
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}

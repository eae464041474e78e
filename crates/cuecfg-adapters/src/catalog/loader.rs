//! JSON catalog loader.
//!
//! Parses a `features.json` catalog into a domain [`Catalog`].
//!
//! # Format
//!
//! ```json
//! {
//!   "base":     { "packageFields": { "private": true }, "ignore": ["base"] },
//!   "features": {
//!     "ts": {
//!       "dependencies":     ["npm"],
//!       "packageFields":    { "types": "./dist/index.d.ts" },
//!       "devDependencies":  { "typescript": "^5.9.0" },
//!       "peerDependencies": {},
//!       "scripts":          { "build": "tsc" },
//!       "ignore":           ["ts"],
//!       "compilerConfig":   "ts",
//!       "auxiliarySchema":  false
//!     }
//!   },
//!   "presets":            { "lib": ["git", "npm", "ts"] },
//!   "ignoreModules":      { "ts": ["dist/"] },
//!   "configPriority":     ["ts", "node", "vite", "react"],
//!   "compilerConfigBase": "@cuecfg/config/ts",
//!   "defaultPreset":      "lib"
//! }
//! ```
//!
//! Only `features` is required; every feature field is optional. A feature's
//! `dependencies` are its prerequisite features.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use cuecfg_core::{
    application::{ApplicationError, ports::CatalogSource},
    domain::{Catalog, Feature, FeatureBuilder},
    error::CuecfgResult,
};

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a catalog file.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CatalogManifest {
    /// Fragments folded before every feature.
    #[serde(default)]
    pub base: Option<FeatureEntry>,
    pub features: BTreeMap<String, FeatureEntry>,
    #[serde(default)]
    pub presets: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub ignore_modules: BTreeMap<String, Vec<String>>,
    pub config_priority: Option<Vec<String>>,
    pub compiler_config_base: Option<String>,
    pub default_preset: Option<String>,
}

/// One entry under `features` (also the shape of `base`).
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeatureEntry {
    /// Prerequisite feature ids.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub package_fields: Map<String, Value>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    /// Script name → command; declaration order is kept.
    #[serde(default)]
    pub scripts: Map<String, Value>,
    #[serde(default)]
    pub ignore: Vec<String>,
    pub compiler_config: Option<String>,
    #[serde(default)]
    pub auxiliary_schema: bool,
}

impl FeatureEntry {
    fn into_feature(self, id: &str) -> Result<Feature, String> {
        let mut builder: FeatureBuilder = Feature::builder(id);

        for prerequisite in self.dependencies {
            builder = builder.requires(prerequisite.as_str());
        }
        builder = builder.fields(self.package_fields);
        for (name, range) in self.dev_dependencies {
            builder = builder.dev_dependency(name, range);
        }
        for (name, range) in self.peer_dependencies {
            builder = builder.peer_dependency(name, range);
        }
        for (name, command) in self.scripts {
            let Value::String(command) = command else {
                return Err(format!("script '{name}' of '{id}' must be a string"));
            };
            builder = builder.script(name, command);
        }
        for module in self.ignore {
            builder = builder.ignore(module);
        }
        if let Some(config) = self.compiler_config {
            builder = builder.compiler_config(config);
        }

        Ok(builder.auxiliary_schema(self.auxiliary_schema).build())
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse catalog JSON text.
///
/// `source_name` only appears in diagnostics. `root` is the directory the
/// catalog was read from, if any.
pub fn parse_catalog(text: &str, source_name: &str, root: Option<PathBuf>) -> CuecfgResult<Catalog> {
    let malformed = |reason: String| ApplicationError::CatalogMalformed {
        source_name: source_name.to_string(),
        reason,
    };

    let manifest: CatalogManifest =
        serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let mut builder = Catalog::builder();

    if let Some(base) = manifest.base {
        let base = base.into_feature("base").map_err(malformed)?;
        builder = builder.base(base.fragments().to_vec());
    }
    for (id, entry) in manifest.features {
        builder = builder.feature(entry.into_feature(&id).map_err(malformed)?);
    }
    for (name, ids) in manifest.presets {
        builder = builder.preset(name, ids.iter().map(String::as_str));
    }
    for (id, lines) in manifest.ignore_modules {
        builder = builder.ignore_module(id, lines);
    }
    if let Some(priority) = manifest.config_priority {
        builder = builder.config_priority(priority);
    }
    if let Some(base) = manifest.compiler_config_base {
        builder = builder.compiler_config_base(base);
    }
    if let Some(name) = manifest.default_preset {
        builder = builder.default_preset(name);
    }
    if let Some(root) = root {
        builder = builder.root(root);
    }

    let catalog = builder.build().map_err(|e| malformed(e.to_string()))?;
    debug!(
        source = source_name,
        features = catalog.len(),
        presets = catalog.preset_names().len(),
        "Catalog parsed"
    );
    Ok(catalog)
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Catalog read from a JSON file on disk.
///
/// The file's directory becomes the catalog root, where evaluator sources
/// and the schema directory are looked up.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn root(&self) -> PathBuf {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        // Symlinks to the root must not depend on the working directory.
        fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf())
    }
}

impl CatalogSource for JsonCatalogSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> CuecfgResult<Catalog> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::CatalogMissing {
                path: self.path.clone(),
            },
            _ => ApplicationError::FilesystemError {
                path: self.path.clone(),
                reason: format!("Failed to read catalog: {e}"),
            },
        })?;

        parse_catalog(&text, &self.describe(), Some(self.root()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecfg_core::domain::Fragment;
    use cuecfg_core::error::{CuecfgError, ErrorCategory};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn parses_minimal_catalog() {
        // The smallest accepted shape: prerequisites and presets only.
        let text = r#"{
            "features": { "git": { "dependencies": [] }, "npm": { "dependencies": ["git"] } },
            "presets": { "lib": ["git", "npm"] }
        }"#;
        let catalog = parse_catalog(text, "test", None).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.feature("npm").unwrap().prerequisites()[0].as_str(), "git");
        assert_eq!(catalog.default_preset(), "lib");
        assert!(catalog.base().is_empty());
    }

    #[test]
    fn parses_fragments_in_declaration_order() {
        let text = r#"{
            "base": { "packageFields": { "private": true } },
            "features": {
                "ts": {
                    "scripts": { "typecheck": "tsc --noEmit", "build": "tsc" },
                    "devDependencies": { "typescript": "^5.9.0" },
                    "compilerConfig": "ts",
                    "auxiliarySchema": true
                }
            }
        }"#;
        let catalog = parse_catalog(text, "test", None).unwrap();
        let ts = catalog.feature("ts").unwrap();

        assert_eq!(ts.config_selector(), Some("ts"));
        assert!(ts.requires_auxiliary_schema());
        assert!(ts.fragments().contains(&Fragment::Scripts(vec![
            ("typecheck".into(), "tsc --noEmit".into()),
            ("build".into(), "tsc".into()),
        ])));
        assert_eq!(
            catalog.base(),
            &[Fragment::Fields(json!({"private": true}).as_object().unwrap().clone())]
        );
    }

    #[test]
    fn rejects_non_string_script() {
        let text = r#"{ "features": { "ts": { "scripts": { "build": 1 } } } }"#;
        let err = parse_catalog(text, "test", None).unwrap_err();
        assert!(err.to_string().contains("script 'build'"));
    }

    #[test]
    fn structural_violations_are_malformed() {
        for text in [
            "not json",
            r#"{ "presets": {} }"#,
            r#"{ "features": { "has space": {} } }"#,
            r#"{ "features": { "git": {} }, "presets": { "lib": [] } }"#,
            r#"{ "features": { "git": {} }, "defaultPreset": "app" }"#,
        ] {
            let err = parse_catalog(text, "test", None).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Configuration, "{text}");
        }
    }

    #[test]
    fn missing_file_is_catalog_missing() {
        let source = JsonCatalogSource::new("/nonexistent/cuecfg/features.json");
        let err = source.load().unwrap_err();
        assert!(matches!(
            err,
            CuecfgError::Application(ApplicationError::CatalogMissing { .. })
        ));
    }

    #[test]
    fn file_directory_becomes_root() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("features.json");
        fs::write(&path, r#"{ "features": { "git": {} } }"#).unwrap();

        let catalog = JsonCatalogSource::new(&path).load().unwrap();
        let root = catalog.root().unwrap();
        assert_eq!(root, fs::canonicalize(temp.path()).unwrap());
    }
}

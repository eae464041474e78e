//! `dependencies.json` persistence.
//!
//! Two shapes are accepted on read:
//!
//! ```json
//! ["git", "npm", "ts"]
//! ```
//!
//! ```json
//! {
//!   "$schema": "./node_modules/@cuecfg/config/dependencies/schema.json",
//!   "name": "my-lib",
//!   "dependencies": ["git", "npm", "ts"],
//!   "compilerConfig": "node",
//!   "overrides": { "type": "commonjs" }
//! }
//! ```
//!
//! Writes always use the object shape with `$schema` first.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use cuecfg_core::{
    application::{
        ApplicationError,
        ports::{DescriptorStore, Filesystem},
    },
    domain::{ProjectDescriptor, ProjectMetadata},
    error::CuecfgResult,
};

/// Descriptor file name inside a project directory.
pub const DESCRIPTOR_FILE: &str = "dependencies.json";

/// `$schema` written into new descriptors.
pub const DESCRIPTOR_SCHEMA: &str = "./node_modules/@cuecfg/config/dependencies/schema.json";

/// On-disk object shape.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorFile {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compiler_config: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    overrides: Map<String, Value>,
}

impl DescriptorFile {
    fn into_descriptor(self) -> ProjectDescriptor {
        let metadata = ProjectMetadata {
            name: self.name,
            version: self.version,
            description: self.description,
            license: self.license,
            author: self.author,
        };
        let mut descriptor = ProjectDescriptor::new(self.dependencies)
            .with_metadata(metadata)
            .with_overrides(self.overrides);
        if let Some(id) = self.compiler_config {
            descriptor = descriptor.with_compiler_config(id);
        }
        descriptor
    }

    fn from_descriptor(descriptor: &ProjectDescriptor) -> Self {
        let metadata = descriptor.metadata().clone();
        Self {
            schema: Some(DESCRIPTOR_SCHEMA.to_string()),
            name: metadata.name,
            version: metadata.version,
            description: metadata.description,
            license: metadata.license,
            author: metadata.author,
            dependencies: descriptor.features().iter().map(|id| id.to_string()).collect(),
            compiler_config: descriptor.compiler_config().map(str::to_string),
            overrides: descriptor.overrides().clone(),
        }
    }
}

/// Parse descriptor text.
///
/// # Errors
///
/// `DescriptorMalformed` when the text is not JSON, or is neither an array
/// of strings nor an object with a `dependencies` array.
pub fn parse_descriptor(text: &str, path: &Path) -> CuecfgResult<ProjectDescriptor> {
    let malformed = |reason: String| ApplicationError::DescriptorMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;
    let file = match value {
        Value::Array(_) => DescriptorFile {
            dependencies: serde_json::from_value(value)
                .map_err(|e| malformed(format!("dependency list: {e}")))?,
            ..DescriptorFile::default()
        },
        Value::Object(ref map) if map.get("dependencies").is_some_and(Value::is_array) => {
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?
        }
        _ => {
            return Err(malformed("must have a \"dependencies\" array".to_string()).into());
        }
    };

    Ok(file.into_descriptor())
}

/// Render a descriptor as pretty JSON with a trailing newline.
pub fn render_descriptor(descriptor: &ProjectDescriptor) -> String {
    let file = DescriptorFile::from_descriptor(descriptor);
    let mut text = serde_json::to_string_pretty(&file).unwrap_or_default();
    text.push('\n');
    text
}

/// Descriptor store over a [`Filesystem`].
#[derive(Debug, Clone)]
pub struct JsonDescriptorStore<F> {
    filesystem: F,
}

impl<F: Filesystem> JsonDescriptorStore<F> {
    pub fn new(filesystem: F) -> Self {
        Self { filesystem }
    }
}

impl<F: Filesystem> DescriptorStore for JsonDescriptorStore<F> {
    #[instrument(skip(self), fields(dir = %project_dir.display()))]
    fn load(&self, project_dir: &Path) -> CuecfgResult<Option<ProjectDescriptor>> {
        let path = self.location(project_dir);
        let Some(text) = self.filesystem.read_to_string(&path)? else {
            debug!(path = %path.display(), "No descriptor");
            return Ok(None);
        };
        parse_descriptor(&text, &path).map(Some)
    }

    #[instrument(skip(self, descriptor), fields(dir = %project_dir.display()))]
    fn save(&self, project_dir: &Path, descriptor: &ProjectDescriptor) -> CuecfgResult<()> {
        let path = self.location(project_dir);
        self.filesystem
            .write_file(&path, &render_descriptor(descriptor))?;
        debug!(
            path = %path.display(),
            features = descriptor.features().len(),
            "Descriptor saved"
        );
        Ok(())
    }

    fn location(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(DESCRIPTOR_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::MemoryFilesystem;
    use cuecfg_core::error::{CuecfgError, ErrorCategory};
    use serde_json::json;

    fn store() -> (JsonDescriptorStore<MemoryFilesystem>, MemoryFilesystem) {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/proj")).unwrap();
        (JsonDescriptorStore::new(fs.clone()), fs)
    }

    #[test]
    fn reads_bare_array() {
        let descriptor = parse_descriptor(r#"["git", "npm"]"#, Path::new("d.json")).unwrap();
        let ids: Vec<_> = descriptor.features().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["git", "npm"]);
        assert!(descriptor.metadata().is_empty());
    }

    #[test]
    fn reads_object_with_metadata_and_overrides() {
        let text = r#"{
            "name": "my-lib",
            "license": "MIT",
            "dependencies": ["ts"],
            "compilerConfig": "node",
            "overrides": { "type": "commonjs" }
        }"#;
        let descriptor = parse_descriptor(text, Path::new("d.json")).unwrap();

        assert_eq!(descriptor.metadata().name.as_deref(), Some("my-lib"));
        assert_eq!(descriptor.metadata().license.as_deref(), Some("MIT"));
        assert_eq!(descriptor.compiler_config(), Some("node"));
        assert_eq!(descriptor.overrides().get("type"), Some(&json!("commonjs")));
    }

    #[test]
    fn rejects_other_shapes() {
        for text in [
            "{",
            r#"{"features": ["ts"]}"#,
            r#"{"dependencies": "ts"}"#,
            r#"[1, 2]"#,
            r#""ts""#,
        ] {
            let err = parse_descriptor(text, Path::new("d.json")).unwrap_err();
            assert!(
                matches!(
                    err,
                    CuecfgError::Application(ApplicationError::DescriptorMalformed { .. })
                ),
                "{text}"
            );
            assert_eq!(err.category(), ErrorCategory::Validation);
        }
    }

    #[test]
    fn load_missing_is_none() {
        let (store, _) = store();
        assert!(store.load(Path::new("/proj")).unwrap().is_none());
    }

    #[test]
    fn save_writes_schema_first() {
        let (store, fs) = store();
        store
            .save(Path::new("/proj"), &ProjectDescriptor::new(["git", "npm"]))
            .unwrap();

        let text = fs
            .read_to_string(Path::new("/proj/dependencies.json"))
            .unwrap()
            .unwrap();
        assert_eq!(
            text,
            format!(
                "{{\n  \"$schema\": \"{DESCRIPTOR_SCHEMA}\",\n  \"dependencies\": [\n    \"git\",\n    \"npm\"\n  ]\n}}\n"
            )
        );
    }

    #[test]
    fn save_then_load_keeps_descriptor() {
        let (store, _) = store();
        let mut overrides = Map::new();
        overrides.insert("private".into(), json!(false));
        let descriptor = ProjectDescriptor::new(["ts", "vitest"])
            .with_metadata(ProjectMetadata {
                name: Some("demo".into()),
                ..ProjectMetadata::default()
            })
            .with_overrides(overrides)
            .with_compiler_config("node");

        store.save(Path::new("/proj"), &descriptor).unwrap();
        assert_eq!(store.load(Path::new("/proj")).unwrap(), Some(descriptor));
    }
}

//! Core domain layer for cuecfg.
//!
//! Pure, synchronous logic over immutable inputs: the feature catalog, the
//! breadth-first resolver, compiler-config selection and the fragment
//! merger. All I/O is reached through ports defined in the application
//! layer.

pub mod entities;
pub mod error;
pub mod merger;
pub mod resolver;
pub mod selector;
pub mod value_objects;

mod validation;

pub use entities::{
    Catalog, CatalogBuilder, CompilerConfigReference, Feature, FeatureBuilder, Fragment,
    IgnorePatternSet, ManifestBuilder, ManifestDocument, PACKAGE_SCHEMA, ProjectDescriptor,
    ProjectMetadata, TSCONFIG_SCHEMA,
};
pub use error::{DomainError, ErrorCategory};
pub use merger::{MergeOutcome, apply_overrides_to, deep_merge, merge, reconcile, render_ignore};
pub use resolver::{Resolution, resolve};
pub use selector::select_config;
pub use validation::DomainValidator;
pub use value_objects::{Backend, ConfigSelectionPolicy, DependencyKind, FeatureId, MergeDirection};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::builder()
            .feature(Feature::builder("git").ignore("git").build())
            .feature(
                Feature::builder("npm")
                    .requires("git")
                    .field("type", json!("module"))
                    .ignore("node")
                    .build(),
            )
            .feature(
                Feature::builder("ts")
                    .requires("npm")
                    .dev_dependency("typescript", "^5.9.0")
                    .script("build", "tsc")
                    .compiler_config("ts")
                    .build(),
            )
            .preset("lib", ["ts"])
            .ignore_module("git", [".DS_Store"])
            .ignore_module("node", ["node_modules/"])
            .build()
            .unwrap()
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn validator_rejects_unknown_feature() {
        let descriptor = ProjectDescriptor::new(["ts", "rust"]);
        let err = DomainValidator::validate_descriptor(&descriptor, &catalog()).unwrap_err();
        assert!(matches!(err, DomainError::UnknownFeature { ref id, .. } if id == "rust"));
    }

    #[test]
    fn validator_accepts_empty_descriptor() {
        let descriptor = ProjectDescriptor::default();
        assert!(DomainValidator::validate_descriptor(&descriptor, &catalog()).is_ok());
    }

    #[test]
    fn validator_parses_known_feature() {
        let id = DomainValidator::validate_feature("npm", &catalog()).unwrap();
        assert_eq!(id.as_str(), "npm");
        assert!(DomainValidator::validate_feature("", &catalog()).is_err());
    }

    // ========================================================================
    // End-to-end domain pipeline
    // ========================================================================

    #[test]
    fn pipeline_produces_all_documents() {
        let catalog = catalog();
        let descriptor = ProjectDescriptor::new(["ts"]);
        let resolution = resolve(descriptor.features(), &catalog);

        let outcome = merge(&resolution, &catalog, &descriptor);
        assert_eq!(
            outcome.manifest.render(),
            "{\n  \"$schema\": \"https://json.schemastore.org/package\",\n  \"type\": \"module\",\n  \"devDependencies\": {\n    \"typescript\": \"^5.9.0\"\n  },\n  \"scripts\": {\n    \"build\": \"tsc\"\n  }\n}\n"
        );

        let config = select_config(&resolution, &catalog, None, ConfigSelectionPolicy::Priority)
            .map(|id| CompilerConfigReference::new(id, catalog.compiler_config_base()));
        assert_eq!(
            config.map(|c| c.extends().to_string()).as_deref(),
            Some("@cuecfg/config/ts/ts.json")
        );

        let ignore = render_ignore(&outcome.ignore_modules, &catalog);
        assert_eq!(ignore.render(), ".DS_Store\nnode_modules/\n");
    }
}

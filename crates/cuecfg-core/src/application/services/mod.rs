//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate the project files" or "add a feature".

pub mod generate_service;
pub mod project_service;

pub use generate_service::{
    Artifact, ArtifactKind, GenerateOptions, GenerateService, GenerationPlan, GenerationReport,
    SchemaLink,
};
pub use project_service::{
    CatalogListing, Change, FeatureInfo, InitReport, PresetInfo, ProjectService, ValidationReport,
};

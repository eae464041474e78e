//! Application layer for cuecfg.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerateService, ProjectService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All resolution and merge rules live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    Artifact, ArtifactKind, CatalogListing, Change, FeatureInfo, GenerateOptions, GenerateService,
    GenerationPlan, GenerationReport, InitReport, PresetInfo, ProjectService, ValidationReport,
};

pub use ports::{
    CatalogSource, DescriptorStore, EvaluationRequest, Evaluator, Filesystem, LinkKind, VetRequest,
};

pub use error::ApplicationError;

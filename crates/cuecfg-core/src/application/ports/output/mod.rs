//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `cuecfg-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::{Catalog, ProjectDescriptor};
use crate::error::CuecfgResult;

/// Port for loading the feature catalog.
///
/// Implemented by:
/// - `cuecfg_adapters::catalog::JsonCatalogSource` (file on disk)
/// - `cuecfg_adapters::catalog::BuiltinCatalog` (embedded in the binary)
#[cfg_attr(test, mockall::automock)]
pub trait CatalogSource: Send + Sync {
    /// Load and validate the catalog.
    ///
    /// Fails with `CatalogMissing` when the definition is absent and
    /// `CatalogMalformed` when it cannot be parsed or validated.
    fn load(&self) -> CuecfgResult<Catalog>;

    /// Human-readable origin of the catalog (a path or "built-in").
    fn describe(&self) -> String;
}

/// Port for persisting the project descriptor.
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorStore: Send + Sync {
    /// Read the descriptor of a project. `Ok(None)` when there is none.
    fn load(&self, project_dir: &Path) -> CuecfgResult<Option<ProjectDescriptor>>;

    /// Write the descriptor, replacing any existing one.
    fn save(&self, project_dir: &Path, descriptor: &ProjectDescriptor) -> CuecfgResult<()>;

    /// Where the descriptor of `project_dir` lives.
    fn location(&self, project_dir: &Path) -> PathBuf;
}

/// One evaluator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// Directory holding the sources; the evaluator runs there.
    pub working_dir: PathBuf,
    /// Source file names relative to `working_dir`, in order.
    pub sources: Vec<String>,
    /// Expression selecting the value to emit.
    pub expression: String,
    /// Logical output being produced, for diagnostics.
    pub output: String,
}

/// One schema check of a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetRequest {
    /// Directory the evaluator runs in.
    pub working_dir: PathBuf,
    /// Schema source declaring `definition`.
    pub schema: PathBuf,
    /// Definition the data must satisfy, e.g. `#Dependencies`.
    pub definition: String,
    /// File being checked.
    pub data: PathBuf,
}

/// Port for the external declarative evaluator.
///
/// Implemented by:
/// - `cuecfg_adapters::evaluator::CueEvaluator` (subprocess)
#[cfg_attr(test, mockall::automock)]
pub trait Evaluator: Send + Sync {
    /// Program name used in diagnostics.
    fn program(&self) -> String;

    /// Check whether the evaluator can be started at all.
    fn is_available(&self) -> bool;

    /// Evaluate the request and parse its output as JSON.
    ///
    /// A non-zero exit or unparsable output is `EvaluationFailed` carrying
    /// the evaluator's diagnostic text verbatim.
    fn evaluate(&self, request: &EvaluationRequest) -> CuecfgResult<Value>;

    /// Check a data file against a schema definition.
    ///
    /// A rejection is `EvaluationFailed` with the evaluator's diagnostic.
    fn vet(&self, request: &VetRequest) -> CuecfgResult<()>;
}

/// How a directory link was materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Symlink,
    Copy,
    /// The link path already existed and was left alone.
    Existing,
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `cuecfg_adapters::filesystem::LocalFilesystem` (production)
/// - `cuecfg_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a UTF-8 file. `Ok(None)` when it does not exist.
    fn read_to_string(&self, path: &Path) -> CuecfgResult<Option<String>>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> CuecfgResult<()>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> CuecfgResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> CuecfgResult<()>;

    /// Make `link` point at the directory `source`.
    ///
    /// Prefers a symbolic link and falls back to a recursive copy. An
    /// existing `link` is left untouched.
    fn link_or_copy_dir(&self, source: &Path, link: &Path) -> CuecfgResult<LinkKind>;
}

//! Application layer errors.
//!
//! These errors represent failures in orchestration and in the ports the
//! services drive. Catalog and resolution rule violations are `DomainError`
//! from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No catalog definition could be found.
    #[error("Feature catalog not found at {path}")]
    CatalogMissing { path: PathBuf },

    /// The catalog definition exists but cannot be used.
    #[error("Feature catalog {source_name} is malformed: {reason}")]
    CatalogMalformed { source_name: String, reason: String },

    /// The project has no descriptor yet.
    #[error("No project descriptor found at {path}")]
    DescriptorMissing { path: PathBuf },

    /// The descriptor exists but cannot be parsed.
    #[error("Project descriptor {path} is malformed: {reason}")]
    DescriptorMalformed { path: PathBuf, reason: String },

    /// The external evaluator failed or returned unusable output.
    #[error("Evaluation of {output} failed:\n{diagnostic}")]
    EvaluationFailed { output: String, diagnostic: String },

    /// The external evaluator program cannot be started.
    #[error("Evaluator '{program}' is not available: {reason}")]
    EvaluatorUnavailable { program: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CatalogMissing { path } => vec![
                format!("Expected a catalog at: {}", path.display()),
                "Pass --catalog <FILE> or set CUECFG_CATALOG".into(),
                "Omit both to use the built-in catalog".into(),
            ],
            Self::CatalogMalformed { .. } => vec![
                "Check the catalog JSON against the documented format".into(),
                "Feature ids must be unique and contain no whitespace".into(),
            ],
            Self::DescriptorMissing { .. } => vec![
                "Create one with: cuecfg init".into(),
                "Or run from the project directory (-C <DIR>)".into(),
            ],
            Self::DescriptorMalformed { .. } => vec![
                "dependencies.json must be an array of feature ids".into(),
                "or an object with a \"dependencies\" array".into(),
            ],
            Self::EvaluationFailed { .. } => vec![
                "The evaluator output above describes the failure".into(),
                "Nothing was written".into(),
                "Try: cuecfg generate --backend native".into(),
            ],
            Self::EvaluatorUnavailable { program, .. } => vec![
                format!("Install '{program}': https://cuelang.org/docs/install/"),
                "Or point generate.evaluator at the binary".into(),
                "Or use the native backend: cuecfg generate --backend native".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CatalogMissing { .. } | Self::DescriptorMissing { .. } => ErrorCategory::NotFound,
            Self::CatalogMalformed { .. } | Self::EvaluatorUnavailable { .. } => {
                ErrorCategory::Configuration
            }
            Self::DescriptorMalformed { .. } => ErrorCategory::Validation,
            Self::EvaluationFailed { .. } | Self::FilesystemError { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

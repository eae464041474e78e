// ============================================================================
// domain/error.rs - CATALOG AND RESOLUTION RULE VIOLATIONS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so services can collect and re-report them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid feature id '{id}': {reason}")]
    InvalidFeatureId { id: String, reason: String },

    #[error("Feature '{id}' is defined more than once")]
    DuplicateFeature { id: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid project descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    // ========================================================================
    // Lookup Errors (the user named something the catalog lacks)
    // ========================================================================
    #[error("Unknown feature '{id}'")]
    UnknownFeature { id: String, available: Vec<String> },

    #[error("Unknown preset '{name}'")]
    UnknownPreset { name: String, available: Vec<String> },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFeatureId { .. } => vec![
                "Feature ids must be non-empty and contain no whitespace".into(),
                "Example: vite-react".into(),
            ],
            Self::DuplicateFeature { id } => vec![
                format!("Remove the second definition of '{id}' from the catalog"),
            ],
            Self::InvalidCatalog(msg) => vec![
                "Check the catalog definition file".into(),
                format!("Details: {msg}"),
            ],
            Self::InvalidDescriptor(msg) => vec![
                "dependencies.json must be an array or have a \"dependencies\" array".into(),
                format!("Details: {msg}"),
            ],
            Self::UnknownFeature { available, .. } => vec![
                format!("Available features: {}", available.join(", ")),
                "Try: cuecfg list".into(),
            ],
            Self::UnknownPreset { available, .. } => vec![
                format!("Available presets: {}", available.join(", ")),
                "Example: cuecfg init --preset lib".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownFeature { .. }
            | Self::UnknownPreset { .. }
            | Self::InvalidFeatureId { .. }
            | Self::InvalidDescriptor(_)
            | Self::InvalidManifest(_)
            | Self::InvalidOption(_) => ErrorCategory::Validation,
            Self::DuplicateFeature { .. } | Self::InvalidCatalog(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Internal,
}

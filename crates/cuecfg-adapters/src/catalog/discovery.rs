//! Catalog discovery.
//!
//! # Resolution order
//!
//! The first candidate that applies wins:
//!
//! 1. **Explicit path**: `--catalog FILE` or `catalog.path` in the config
//!    file. A missing explicit path is an error; nothing else is tried.
//! 2. **`$CUECFG_CATALOG`**: environment override. A path that does not
//!    exist is skipped with a warning.
//! 3. **`<project-dir>/features.json`**: a catalog checked in next to the
//!    project.
//! 4. **Built-in**: the catalog embedded in the binary.
//!
//! ```env
//! CUECFG_CATALOG=./catalog/features.json
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use cuecfg_core::{application::ports::CatalogSource, domain::Catalog, error::CuecfgResult};

use super::loader::{JsonCatalogSource, parse_catalog};

/// Environment variable naming a catalog file.
pub const CATALOG_ENV: &str = "CUECFG_CATALOG";

/// Catalog file name looked up in the project directory.
pub const CATALOG_FILE: &str = "features.json";

const BUILTIN_CATALOG: &str = include_str!("../../catalog/features.json");

// ── Built-in catalog ──────────────────────────────────────────────────────────

/// The catalog shipped inside the binary.
///
/// It has no root directory, so the `cue` backend and schema linking are
/// unavailable with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogSource for BuiltinCatalog {
    fn load(&self) -> CuecfgResult<Catalog> {
        parse_catalog(BUILTIN_CATALOG, &self.describe(), None)
    }

    fn describe(&self) -> String {
        "built-in".to_string()
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Where the catalog was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Explicit(PathBuf),
    Environment(PathBuf),
    ProjectDir(PathBuf),
    Builtin,
}

impl CatalogLocation {
    /// Build the matching catalog source.
    pub fn into_source(self) -> Box<dyn CatalogSource> {
        match self {
            Self::Explicit(path) | Self::Environment(path) | Self::ProjectDir(path) => {
                Box::new(JsonCatalogSource::new(path))
            }
            Self::Builtin => Box::new(BuiltinCatalog),
        }
    }
}

/// Pick the catalog location.
///
/// `env_value` is the value of [`CATALOG_ENV`], passed in so callers own
/// the process environment.
#[instrument(level = "debug")]
pub fn locate(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    project_dir: &Path,
) -> CatalogLocation {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "Using explicit catalog path");
        return CatalogLocation::Explicit(path.to_path_buf());
    }

    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        let path = PathBuf::from(value);
        if path.is_file() {
            debug!(path = %path.display(), "Using catalog from ${CATALOG_ENV}");
            return CatalogLocation::Environment(path);
        }
        warn!(path = %path.display(), "${CATALOG_ENV} does not name a file, ignoring");
    }

    let local = project_dir.join(CATALOG_FILE);
    if local.is_file() {
        debug!(path = %local.display(), "Using catalog from project directory");
        return CatalogLocation::ProjectDir(local);
    }

    info!("No catalog file found, using the built-in catalog");
    CatalogLocation::Builtin
}

/// Locate the catalog and return its source.
pub fn discover(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    project_dir: &Path,
) -> Box<dyn CatalogSource> {
    locate(explicit, env_value, project_dir).into_source()
}

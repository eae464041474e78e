//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (applied at the call-site, not here)
//! 2. Environment variables: `CUECFG__SECTION__KEY`, e.g.
//!    `CUECFG__GENERATE__BACKEND=cue`
//! 3. Config file: `--config FILE`, or `cuecfg/config.toml` in the platform
//!    config directory
//! 4. Built-in defaults
//!
//! ```toml
//! [catalog]
//! path = "./catalog/features.json"
//!
//! [generate]
//! backend = "native"
//! config_policy = "priority"
//! merge_existing = false
//! merge_direction = "generated-wins"
//! evaluator = "cue"
//! evaluator_timeout_secs = 30
//!
//! [output]
//! no_color = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cuecfg_core::domain::{Backend, ConfigSelectionPolicy, MergeDirection};

/// Environment prefix for configuration overrides.
const ENV_PREFIX: &str = "CUECFG";
const ENV_SEPARATOR: &str = "__";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub generate: GenerateConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Explicit catalog file; discovery is skipped when set.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub backend: Backend,
    pub config_policy: ConfigSelectionPolicy,
    pub merge_existing: bool,
    pub merge_direction: MergeDirection,
    /// Evaluator program for the `cue` backend.
    pub evaluator: String,
    pub evaluator_timeout_secs: Option<u64>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Native,
            config_policy: ConfigSelectionPolicy::Priority,
            merge_existing: false,
            merge_direction: MergeDirection::GeneratedWins,
            evaluator: cuecfg_adapters::evaluator::DEFAULT_PROGRAM.to_string(),
            evaluator_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "Loading configuration");

        let defaults = config::Config::try_from(&Self::default())
            .context("Failed to serialise default configuration")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.cuecfg.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "cuecfg", "cuecfg")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".cuecfg.toml"))
    }

    /// Look up a dotted key, e.g. `generate.backend`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "catalog.path" => self
                .catalog
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "generate.backend" => self.generate.backend.to_string(),
            "generate.config_policy" => self.generate.config_policy.to_string(),
            "generate.merge_existing" => self.generate.merge_existing.to_string(),
            "generate.merge_direction" => self.generate.merge_direction.to_string(),
            "generate.evaluator" => self.generate.evaluator.clone(),
            "generate.evaluator_timeout_secs" => self
                .generate
                .evaluator_timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_default(),
            "output.no_color" => self.output.no_color.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Every key accepted by [`Self::get`].
    pub const KEYS: [&'static str; 8] = [
        "catalog.path",
        "generate.backend",
        "generate.config_policy",
        "generate.merge_existing",
        "generate.merge_direction",
        "generate.evaluator",
        "generate.evaluator_timeout_secs",
        "output.no_color",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generate.backend, Backend::Native);
        assert_eq!(cfg.generate.config_policy, ConfigSelectionPolicy::Priority);
        assert_eq!(cfg.generate.evaluator, "cue");
        assert!(!cfg.generate.merge_existing);
        assert!(!cfg.output.no_color);
        assert!(cfg.catalog.path.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[generate]\nbackend = \"cue\"\nconfig_policy = \"last-feature-wins\"\nevaluator_timeout_secs = 5\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.generate.backend, Backend::Cue);
        assert_eq!(cfg.generate.config_policy, ConfigSelectionPolicy::LastFeatureWins);
        assert_eq!(cfg.generate.evaluator_timeout_secs, Some(5));
        // Untouched keys keep their defaults.
        assert_eq!(cfg.generate.evaluator, "cue");
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(AppConfig::load(Some(&temp.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn invalid_value_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[generate]\nbackend = \"make\"\n").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn every_key_is_readable() {
        let cfg = AppConfig::default();
        for key in AppConfig::KEYS {
            assert!(cfg.get(key).is_some(), "{key}");
        }
        assert_eq!(cfg.get("generate.backend").as_deref(), Some("native"));
        assert!(cfg.get("does.not.exist").is_none());
    }

    #[test]
    fn config_path_is_not_empty() {
        assert!(!AppConfig::config_path().as_os_str().is_empty());
    }
}

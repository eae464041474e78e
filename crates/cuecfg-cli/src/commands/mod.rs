//! Command handlers.
//!
//! Each handler translates CLI arguments into a core service call and
//! renders the result. Adapter wiring lives here so handlers stay small.

pub mod add;
pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod list;
pub mod remove;
pub mod validate;

use std::path::Path;
use std::time::Duration;

use tracing::debug;

use cuecfg_adapters::{
    CueEvaluator, JsonDescriptorStore, LocalFilesystem,
    catalog::{CATALOG_ENV, discover},
};
use cuecfg_core::application::{
    GenerateService, ProjectService,
    ports::{CatalogSource, Evaluator},
};

use crate::{
    cli::GlobalArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Catalog source for this invocation.
///
/// `--catalog` beats `catalog.path`; without either, discovery runs.
fn catalog_source(global: &GlobalArgs, config: &AppConfig) -> Box<dyn CatalogSource> {
    let explicit = global.catalog.as_deref().or(config.catalog.path.as_deref());
    let env_value = std::env::var(CATALOG_ENV).ok();
    let source = discover(explicit, env_value.as_deref(), &global.project_dir);
    debug!(catalog = %source.describe(), "Catalog selected");
    source
}

fn evaluator(config: &AppConfig) -> Box<dyn Evaluator> {
    let mut evaluator = CueEvaluator::new(config.generate.evaluator.as_str());
    if let Some(secs) = config.generate.evaluator_timeout_secs {
        evaluator = evaluator.with_timeout(Duration::from_secs(secs));
    }
    Box::new(evaluator)
}

/// `-C` must name an existing directory.
fn check_project_dir(project_dir: &Path) -> CliResult<()> {
    if project_dir.is_dir() {
        return Ok(());
    }
    let problem = if project_dir.exists() {
        "is not a directory"
    } else {
        "does not exist"
    };
    Err(CliError::InvalidInput {
        message: format!("project directory '{}' {problem}", project_dir.display()),
        source: None,
    })
}

pub(crate) fn project_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<ProjectService> {
    check_project_dir(&global.project_dir)?;
    Ok(ProjectService::new(
        catalog_source(global, config),
        Box::new(JsonDescriptorStore::new(LocalFilesystem::new())),
        Box::new(LocalFilesystem::new()),
    )
    .with_evaluator(evaluator(config)))
}

pub(crate) fn generate_service(global: &GlobalArgs, config: &AppConfig) -> CliResult<GenerateService> {
    check_project_dir(&global.project_dir)?;
    Ok(GenerateService::new(
        catalog_source(global, config),
        Box::new(JsonDescriptorStore::new(LocalFilesystem::new())),
        Box::new(LocalFilesystem::new()),
        Some(evaluator(config)),
    ))
}

/// `path` relative to the project directory, for messages.
pub(crate) fn display_path(path: &Path, project_dir: &Path) -> String {
    path.strip_prefix(project_dir)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn project_dir_must_be_a_directory() {
        let dir = TempDir::new().unwrap();
        assert!(check_project_dir(dir.path()).is_ok());

        let file = dir.path().join("dependencies.json");
        std::fs::write(&file, "[]").unwrap();
        let err = check_project_dir(&file).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));

        let err = check_project_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn display_path_strips_project_dir() {
        assert_eq!(
            display_path(Path::new("app/package.json"), Path::new("app")),
            "package.json"
        );
        assert_eq!(
            display_path(Path::new("/elsewhere/x"), Path::new("app")),
            "/elsewhere/x"
        );
    }
}

//! `cuecfg add`: append a feature to dependencies.json.

use serde_json::json;
use tracing::instrument;

use cuecfg_core::application::Change;

use crate::{
    cli::{FeatureArgs, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::project_service;

#[instrument(skip_all, fields(feature = %args.feature))]
pub fn execute(
    args: FeatureArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = project_service(&global, &config)?;
    let change = service.add(&global.project_dir, &args.feature)?;

    if output.is_json() {
        output.json(&json!({
            "feature": args.feature,
            "changed": change == Change::Applied,
        }))?;
        return Ok(());
    }

    match change {
        Change::Applied => {
            output.success(&format!("Added '{}' to dependencies.json", args.feature))?
        }
        Change::Unchanged => output.info(&format!(
            "'{}' is already in dependencies.json",
            args.feature
        ))?,
    }

    Ok(())
}

//! `cuecfg validate`: check dependencies.json against the catalog.

use serde_json::json;
use tracing::instrument;

use cuecfg_core::domain::FeatureId;

use crate::{cli::GlobalArgs, config::AppConfig, error::CliResult, output::OutputManager};

use super::{display_path, project_service};

#[instrument(skip_all)]
pub fn execute(global: GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let service = project_service(&global, &config)?;
    let report = service.validate(&global.project_dir)?;

    let requested: Vec<&str> = report.requested.iter().map(FeatureId::as_str).collect();
    let resolved: Vec<&str> = report
        .resolution
        .features()
        .iter()
        .map(FeatureId::as_str)
        .collect();

    if output.is_json() {
        output.json(&json!({
            "valid": true,
            "descriptor": report.descriptor_path,
            "requested": requested,
            "resolved": resolved,
            "schemaChecked": report.schema_checked,
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "{} is valid",
        display_path(&report.descriptor_path, &global.project_dir)
    ))?;
    output.print(&format!("  Requested: {}", requested.join(", ")))?;
    output.print(&format!("  Resolved:  {}", resolved.join(", ")))?;
    if report.schema_checked {
        output.print(&format!("  {}", output.dim("Schema check passed")))?;
    }

    Ok(())
}

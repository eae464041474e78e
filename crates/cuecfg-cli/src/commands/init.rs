//! `cuecfg init`: create dependencies.json from a preset.

use serde_json::json;
use tracing::instrument;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::{display_path, project_service};

/// Write a descriptor listing the preset's features.
#[instrument(skip_all, fields(preset = args.preset.as_deref().unwrap_or("default")))]
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = project_service(&global, &config)?;
    let report = service.init(&global.project_dir, args.preset.as_deref(), args.force)?;

    let features: Vec<&str> = report.features.iter().map(|id| id.as_str()).collect();
    let descriptor = display_path(&report.descriptor_path, &global.project_dir);

    if output.is_json() {
        output.json(&json!({
            "preset": report.preset,
            "features": features,
            "descriptor": report.descriptor_path,
            "written": report.descriptor_written,
            "entryPoint": report.entry_point,
        }))?;
        return Ok(());
    }

    if report.descriptor_written {
        output.success(&format!(
            "Created {descriptor} with preset '{}'",
            report.preset
        ))?;
        output.print(&format!("  {}", output.dim(&features.join(", "))))?;
    } else {
        output.warning(&format!(
            "{descriptor} already exists (use --force to overwrite)"
        ))?;
    }

    if let Some(entry) = &report.entry_point {
        output.info(&format!(
            "Created {}",
            display_path(entry, &global.project_dir)
        ))?;
    }

    if report.descriptor_written {
        output.print("")?;
        output.print("Next steps:")?;
        output.print("  cuecfg add <feature>")?;
        output.print("  cuecfg generate")?;
    }

    Ok(())
}

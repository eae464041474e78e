//! `cuecfg generate`: write package.json, tsconfig.json and .gitignore.

use serde_json::json;
use tracing::instrument;

use cuecfg_core::{
    application::{GenerateOptions, GenerationReport, LinkKind},
    domain::{FeatureId, MergeDirection},
};

use crate::{
    cli::{GenerateArgs, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::{display_path, generate_service};

/// Flags win over `[generate]` settings.
fn options(args: &GenerateArgs, global: &GlobalArgs, config: &AppConfig) -> GenerateOptions {
    let backend = args.backend.map(Into::into).unwrap_or(config.generate.backend);
    let policy = args
        .policy
        .map(Into::into)
        .unwrap_or(config.generate.config_policy);
    let direction = if args.prefer_existing {
        MergeDirection::ExistingWins
    } else {
        config.generate.merge_direction
    };

    GenerateOptions::new(&global.project_dir)
        .backend(backend)
        .policy(policy)
        .merge_existing(args.merge_existing || config.generate.merge_existing)
        .direction(direction)
        .dry_run(args.dry_run)
}

#[instrument(skip_all, fields(dry_run = args.dry_run))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let options = options(&args, &global, &config);
    let service = generate_service(&global, &config)?;
    let report = service.generate(&options)?;

    if output.is_json() {
        return json_summary(&report, &output);
    }

    for id in report.plan.resolution.unknown() {
        output.warning(&format!("Unknown feature '{id}' ignored"))?;
    }

    if report.dry_run {
        for artifact in &report.plan.artifacts {
            output.header(&format!(
                "── {} ──",
                display_path(&artifact.path, &global.project_dir)
            ))?;
            output.raw(&artifact.contents)?;
        }
        output.info("Dry run: nothing was written")?;
        return Ok(());
    }

    let features: Vec<&str> = report
        .plan
        .resolution
        .features()
        .iter()
        .map(FeatureId::as_str)
        .collect();
    output.print(&format!("Features: {}", output.dim(&features.join(", "))))?;

    for path in &report.written {
        output.success(&format!("Wrote {}", display_path(path, &global.project_dir)))?;
    }

    match report.link {
        Some(LinkKind::Symlink) => output.info("Linked catalog schemas into cue.mod")?,
        Some(LinkKind::Copy) => output.info("Copied catalog schemas into cue.mod")?,
        Some(LinkKind::Existing) | None => {}
    }

    Ok(())
}

fn json_summary(report: &GenerationReport, output: &OutputManager) -> CliResult<()> {
    let features: Vec<&str> = report
        .plan
        .resolution
        .features()
        .iter()
        .map(FeatureId::as_str)
        .collect();
    let unknown: Vec<&str> = report
        .plan
        .resolution
        .unknown()
        .iter()
        .map(FeatureId::as_str)
        .collect();
    let link = report.link.map(|kind| match kind {
        LinkKind::Symlink => "symlink",
        LinkKind::Copy => "copy",
        LinkKind::Existing => "existing",
    });
    let artifacts: Vec<_> = report
        .plan
        .artifacts
        .iter()
        .map(|a| json!({ "file": a.kind.file_name(), "path": a.path }))
        .collect();

    output.json(&json!({
        "dryRun": report.dry_run,
        "features": features,
        "unknown": unknown,
        "compilerConfig": report.plan.compiler_config,
        "artifacts": artifacts,
        "written": report.written,
        "link": link,
    }))?;
    Ok(())
}

//! Implementation of the `cuecfg list` command.

use serde_json::{Value, json};

use cuecfg_core::application::CatalogListing;

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

use super::project_service;

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let listing = project_service(&global, &config)?.list()?;

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => print_table(&listing, &output)?,
        // JSON and plain ids bypass quiet mode so they stay pipeable.
        ListFormat::Json => output.json(&to_json(&listing))?,
        ListFormat::List => {
            let mut ids = String::new();
            for feature in &listing.features {
                ids.push_str(&feature.id);
                ids.push('\n');
            }
            output.raw(&ids)?;
        }
    }

    Ok(())
}

fn print_table(listing: &CatalogListing, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Features ({}):", listing.source))?;
    let width = listing
        .features
        .iter()
        .map(|f| f.id.len())
        .max()
        .unwrap_or(0);
    for feature in &listing.features {
        let mut notes = Vec::new();
        if !feature.prerequisites.is_empty() {
            notes.push(format!("requires {}", feature.prerequisites.join(", ")));
        }
        if let Some(config) = &feature.compiler_config {
            notes.push(format!("tsconfig {config}"));
        }
        if feature.auxiliary_schema {
            notes.push("schema".to_string());
        }
        output.print(&format!(
            "  {:<width$}  {}",
            feature.id,
            output.dim(&notes.join("; "))
        ))?;
    }

    output.print("")?;
    output.header("Presets:")?;
    for preset in &listing.presets {
        let marker = if preset.is_default { " (default)" } else { "" };
        output.print(&format!(
            "  {}{marker}: {}",
            preset.name,
            preset.features.join(", ")
        ))?;
    }
    Ok(())
}

fn to_json(listing: &CatalogListing) -> Value {
    let features: Vec<Value> = listing
        .features
        .iter()
        .map(|f| {
            json!({
                "id": f.id,
                "requires": f.prerequisites,
                "compilerConfig": f.compiler_config,
                "auxiliarySchema": f.auxiliary_schema,
            })
        })
        .collect();
    let presets: Vec<Value> = listing
        .presets
        .iter()
        .map(|p| json!({ "name": p.name, "features": p.features, "default": p.is_default }))
        .collect();

    json!({
        "source": listing.source,
        "features": features,
        "presets": presets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuecfg_core::application::{FeatureInfo, PresetInfo};

    #[test]
    fn json_listing_shape() {
        let listing = CatalogListing {
            source: "built-in".into(),
            features: vec![FeatureInfo {
                id: "vitest".into(),
                prerequisites: vec!["vite".into()],
                compiler_config: None,
                auxiliary_schema: false,
            }],
            presets: vec![PresetInfo {
                name: "lib".into(),
                features: vec!["ts".into()],
                is_default: true,
            }],
        };

        let value = to_json(&listing);
        assert_eq!(value["source"], "built-in");
        assert_eq!(value["features"][0]["id"], "vitest");
        assert_eq!(value["features"][0]["requires"][0], "vite");
        assert!(value["features"][0]["compilerConfig"].is_null());
        assert_eq!(value["presets"][0]["default"], true);
    }
}

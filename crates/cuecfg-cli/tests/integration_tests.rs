//! Integration tests for the `cuecfg` binary.

use std::fs;
use std::path::Path;

use assert_cmd::{Command, cargo};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// A `cuecfg` command isolated from the host's config and catalog.
fn cuecfg(home: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("cuecfg");
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("CUECFG_CATALOG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("dependencies.json"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_color_env_accepts_any_value() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .env("NO_COLOR", "yes please")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{1b}[").not());
    cuecfg(temp.path())
        .env("NO_COLOR", "")
        .args(["--no-color", "list"])
        .assert()
        .success();
}

// ============================================================================
// init / add / remove
// ============================================================================

#[test]
fn init_writes_descriptor_and_entry_point() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .args(["init", "--preset", "node-app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("preset 'node-app'"));

    let descriptor = read_json(&temp.path().join("dependencies.json"));
    assert_eq!(
        descriptor["dependencies"],
        serde_json::json!(["git", "npm", "ts", "node"])
    );
    assert!(temp.path().join("src/index.ts").is_file());
}

#[test]
fn init_keeps_existing_descriptor_without_force() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();
    cuecfg(temp.path())
        .args(["init", "--preset", "app"])
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));

    let descriptor = read_json(&temp.path().join("dependencies.json"));
    assert_eq!(descriptor["dependencies"], serde_json::json!(["git", "npm", "ts"]));

    cuecfg(temp.path())
        .args(["init", "--preset", "app", "--force"])
        .assert()
        .success();
    let descriptor = read_json(&temp.path().join("dependencies.json"));
    assert_eq!(
        descriptor["dependencies"],
        serde_json::json!(["git", "npm", "ts", "vite-react"])
    );
}

#[test]
fn add_and_remove_round_trip_through_project_dir_flag() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("app");
    fs::create_dir(&project).unwrap();

    cuecfg(temp.path())
        .args(["-C", "app", "init"])
        .assert()
        .success();
    cuecfg(temp.path())
        .args(["-C", "app", "add", "vitest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 'vitest'"));
    cuecfg(temp.path())
        .args(["-C", "app", "add", "vitest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already"));

    let descriptor = read_json(&project.join("dependencies.json"));
    assert_eq!(
        descriptor["dependencies"],
        serde_json::json!(["git", "npm", "ts", "vitest"])
    );

    cuecfg(temp.path())
        .args(["-C", "app", "rm", "vitest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 'vitest'"));
    let descriptor = read_json(&project.join("dependencies.json"));
    assert_eq!(descriptor["dependencies"], serde_json::json!(["git", "npm", "ts"]));
}

// ============================================================================
// generate / validate
// ============================================================================

#[test]
fn generate_writes_all_three_files() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();
    cuecfg(temp.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote package.json"))
        .stdout(predicate::str::contains("Wrote tsconfig.json"))
        .stdout(predicate::str::contains("Wrote .gitignore"));

    let manifest = read_json(&temp.path().join("package.json"));
    assert_eq!(manifest["devDependencies"]["typescript"], "^5.9.0");
    let tsconfig = read_json(&temp.path().join("tsconfig.json"));
    assert_eq!(tsconfig["extends"], "@cuecfg/config/ts/ts.json");
    let ignore = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
    assert!(ignore.contains("node_modules/"));
}

#[test]
fn generate_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();
    cuecfg(temp.path())
        .args(["generate", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("package.json"))
        .stdout(predicate::str::contains("\"devDependencies\""))
        .stdout(predicate::str::contains("nothing was written"));

    assert!(!temp.path().join("package.json").exists());
    assert!(!temp.path().join("tsconfig.json").exists());
    assert!(!temp.path().join(".gitignore").exists());
}

#[test]
fn generate_merge_existing_keeps_user_fields() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();
    fs::write(
        temp.path().join("package.json"),
        r#"{"name": "mine", "keywords": ["kept"]}"#,
    )
    .unwrap();

    cuecfg(temp.path())
        .args(["generate", "--merge-existing"])
        .assert()
        .success();

    let manifest = read_json(&temp.path().join("package.json"));
    assert_eq!(manifest["keywords"], serde_json::json!(["kept"]));
    assert_eq!(manifest["devDependencies"]["typescript"], "^5.9.0");
}

#[test]
fn generate_warns_about_unknown_features() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("dependencies.json"), r#"["ghost-x", "ts"]"#).unwrap();

    cuecfg(temp.path())
        .args(["-q", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unknown feature 'ghost-x' ignored"));
    assert!(temp.path().join("package.json").is_file());

    let out = cuecfg(temp.path())
        .args(["--output-format", "json", "generate", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["unknown"], serde_json::json!(["ghost-x"]));
    assert!(
        summary["features"]
            .as_array()
            .unwrap()
            .iter()
            .all(|f| f != "ghost-x")
    );
}

#[test]
fn validate_reports_resolved_features() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();
    cuecfg(temp.path())
        .args(["add", "vitest"])
        .assert()
        .success();

    cuecfg(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("vitest"));
}

#[test]
fn json_output_format() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path()).arg("init").assert().success();

    let out = cuecfg(temp.path())
        .args(["--output-format", "json", "generate", "--dry-run"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let summary: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["dryRun"], true);
    assert_eq!(summary["artifacts"].as_array().map(Vec::len), Some(3));
    assert_eq!(summary["features"][0], "git");
}

// ============================================================================
// list / completions / config
// ============================================================================

#[test]
fn list_json_describes_builtin_catalog() {
    let temp = TempDir::new().unwrap();
    let out = cuecfg(temp.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let listing: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(listing["source"], "built-in");
    let ids: Vec<&str> = listing["features"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["id"].as_str())
        .collect();
    assert!(ids.contains(&"vitest"));
    assert!(ids.contains(&"vite-react"));
}

#[test]
fn list_table_shows_default_preset() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("Presets:"))
        .stdout(predicate::str::contains("lib (default)"));
}

#[test]
fn project_catalog_is_discovered() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("features.json"),
        r#"{"features": {"only": {"devDependencies": {"x": "1"}}}, "presets": {"lib": ["only"]}}"#,
    )
    .unwrap();

    cuecfg(temp.path())
        .args(["list", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::eq("only\n"));
}

#[test]
fn completions_bash() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cuecfg"));
}

#[test]
fn config_get_reads_environment() {
    let temp = TempDir::new().unwrap();
    cuecfg(temp.path())
        .env("CUECFG__GENERATE__BACKEND", "cue")
        .args(["config", "get", "generate.backend"])
        .assert()
        .success()
        .stdout(predicate::eq("cue\n"));
}

#[test]
fn config_init_then_refuses_overwrite() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("cuecfg.toml");

    cuecfg(temp.path())
        .arg("--config")
        .arg(&file)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(file.is_file());

    cuecfg(temp.path())
        .arg("--config")
        .arg(&file)
        .args(["config", "get", "generate.config_policy"])
        .assert()
        .success()
        .stdout(predicate::eq("priority\n"));

    cuecfg(temp.path())
        .arg("--config")
        .arg(&file)
        .args(["config", "init"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}

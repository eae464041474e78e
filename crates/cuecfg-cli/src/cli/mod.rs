//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use cuecfg_core::domain::{Backend, ConfigSelectionPolicy};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "cuecfg",
    bin_name = "cuecfg",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate package.json, tsconfig.json and .gitignore from features",
    long_about = "cuecfg reads the features listed in dependencies.json, resolves \
                  their prerequisites against a feature catalog and generates the \
                  project's package.json, tsconfig.json and .gitignore.",
    after_help = "EXAMPLES:\n\
        \x20 cuecfg init --preset node-app\n\
        \x20 cuecfg add vitest\n\
        \x20 cuecfg generate --dry-run\n\
        \x20 cuecfg -C packages/api generate --merge-existing",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create dependencies.json from a preset.
    #[command(
        about = "Initialise dependencies.json from a preset",
        after_help = "EXAMPLES:\n\
            \x20 cuecfg init                  # default preset\n\
            \x20 cuecfg init --preset app\n\
            \x20 cuecfg init --force          # overwrite an existing descriptor"
    )]
    Init(InitArgs),

    /// Add a feature to dependencies.json.
    #[command(about = "Add a feature to dependencies.json")]
    Add(FeatureArgs),

    /// Remove a feature from dependencies.json.
    #[command(visible_alias = "rm", about = "Remove a feature from dependencies.json")]
    Remove(FeatureArgs),

    /// Generate the project files.
    #[command(
        visible_alias = "gen",
        about = "Generate package.json, tsconfig.json and .gitignore",
        after_help = "EXAMPLES:\n\
            \x20 cuecfg generate\n\
            \x20 cuecfg generate --dry-run\n\
            \x20 cuecfg generate --backend cue\n\
            \x20 cuecfg generate --merge-existing --prefer-existing"
    )]
    Generate(GenerateArgs),

    /// Check dependencies.json against the catalog.
    #[command(about = "Validate dependencies.json")]
    Validate,

    /// List catalog features and presets.
    #[command(
        visible_alias = "ls",
        about = "List available features and presets",
        after_help = "EXAMPLES:\n\
            \x20 cuecfg list\n\
            \x20 cuecfg list --format json\n\
            \x20 cuecfg --catalog ./features.json list"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 cuecfg completions bash > ~/.local/share/bash-completion/completions/cuecfg\n\
            \x20 cuecfg completions zsh  > ~/.zfunc/_cuecfg\n\
            \x20 cuecfg completions fish > ~/.config/fish/completions/cuecfg.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect or create the cuecfg configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 cuecfg config get generate.backend\n\
            \x20 cuecfg config list\n\
            \x20 cuecfg config init"
    )]
    Config(ConfigCommands),
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `cuecfg init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Preset to start from; defaults to the catalog's default preset.
    #[arg(short = 'p', long = "preset", value_name = "NAME", help = "Preset name")]
    pub preset: Option<String>,

    /// Overwrite an existing dependencies.json.
    #[arg(short = 'f', long = "force", help = "Overwrite existing dependencies.json")]
    pub force: bool,
}

// ── add / remove ──────────────────────────────────────────────────────────────

/// Arguments for `cuecfg add` and `cuecfg remove`.
#[derive(Debug, Args)]
pub struct FeatureArgs {
    #[arg(value_name = "FEATURE", help = "Feature id, e.g. vitest")]
    pub feature: String,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `cuecfg generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Fragment backend; overrides `generate.backend`.
    #[arg(long = "backend", value_enum, help = "Fragment backend")]
    pub backend: Option<BackendArg>,

    /// Compiler-config selection policy; overrides `generate.config_policy`.
    #[arg(long = "policy", value_enum, help = "Compiler config selection policy")]
    pub policy: Option<PolicyArg>,

    /// Deep-merge with the package.json already on disk.
    #[arg(long = "merge-existing", help = "Merge with the existing package.json")]
    pub merge_existing: bool,

    /// With `--merge-existing`, keep existing scalar values on conflict.
    #[arg(
        long = "prefer-existing",
        requires = "merge_existing",
        help = "Existing values win scalar conflicts"
    )]
    pub prefer_existing: bool,

    /// Print what would be written without writing it.
    #[arg(long = "dry-run", help = "Show generated files without writing")]
    pub dry_run: bool,
}

/// `--backend` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Fold catalog fragments in-process.
    Native,
    /// Delegate to the `cue` evaluator.
    Cue,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Native => Backend::Native,
            BackendArg::Cue => Backend::Cue,
        }
    }
}

/// `--policy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Catalog priority list; the last present entry wins.
    Priority,
    /// The last resolved feature with a selector wins.
    LastFeatureWins,
}

impl From<PolicyArg> for ConfigSelectionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Priority => ConfigSelectionPolicy::Priority,
            PolicyArg::LastFeatureWins => ConfigSelectionPolicy::LastFeatureWins,
        }
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `cuecfg list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One feature id per line.
    List,
    /// JSON document.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `cuecfg completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `cuecfg config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `generate.backend`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

// ── tests ─────────────────────────────────────────────────────────────────────

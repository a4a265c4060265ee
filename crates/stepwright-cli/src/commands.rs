//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stepwright: natural-language UI test steps, translated once and replayed
#[derive(Parser, Debug)]
#[command(name = "stepwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP translation service
    Serve(ServeArgs),

    /// Translate a single step against a snapshot file
    Translate(TranslateArgs),

    /// Run a scenario against an in-memory UI loaded from a snapshot
    Run(RunArgs),

    /// Inspect and manage saved artifacts
    Artifact(ArtifactArgs),
}

/// Arguments for `serve`
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "8787")]
    pub port: u16,

    /// Directory `/save-artifact` writes to
    #[arg(long, default_value = crate::config::DEFAULT_ARTIFACT_DIR, env = "STEPWRIGHT_ARTIFACT_DIR")]
    pub artifact_dir: PathBuf,

    /// Model call timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

/// Arguments for `translate`
#[derive(Parser, Debug)]
pub struct TranslateArgs {
    /// Natural-language step
    #[arg(short, long)]
    pub step: String,

    /// Semantics tree snapshot (JSON)
    #[arg(short, long)]
    pub tree: PathBuf,

    /// Print the actions as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Model call timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

/// Arguments for `run`
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario file (YAML or JSON with `name` and `steps`)
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Semantics tree snapshot the in-memory UI starts from
    #[arg(short, long)]
    pub tree: PathBuf,

    /// Artifact directory
    #[arg(long, default_value = crate::config::DEFAULT_ARTIFACT_DIR, env = "STEPWRIGHT_ARTIFACT_DIR")]
    pub artifact_dir: PathBuf,

    /// Send translations to a running service instead of a model backend
    #[arg(long, env = "STEPWRIGHT_SERVICE_URL")]
    pub service: Option<String>,

    /// Ignore any saved artifact and translate every step
    #[arg(long)]
    pub regenerate: bool,

    /// Model call timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `artifact`
#[derive(Parser, Debug)]
pub struct ArtifactArgs {
    /// Artifact directory
    #[arg(long, default_value = crate::config::DEFAULT_ARTIFACT_DIR, env = "STEPWRIGHT_ARTIFACT_DIR", global = true)]
    pub artifact_dir: PathBuf,

    /// Artifact operation
    #[command(subcommand)]
    pub command: ArtifactCommand,
}

/// Artifact operations
#[derive(Subcommand, Debug)]
pub enum ArtifactCommand {
    /// Print an artifact
    Show {
        /// Scenario name
        name: String,
    },

    /// Check whether an artifact is still valid for a scenario file
    Check {
        /// Scenario name
        name: String,

        /// Scenario file to compare against
        #[arg(short, long)]
        scenario: PathBuf,
    },

    /// List saved artifacts
    List,

    /// Delete an artifact
    Delete {
        /// Scenario name
        name: String,
    },
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

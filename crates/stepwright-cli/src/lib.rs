//! Stepwright CLI library
//!
//! Command definitions, handlers and the HTTP translation service behind the
//! `stepwright` binary.

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod output;
pub mod server;

pub use commands::{
    ArtifactArgs, ArtifactCommand, Cli, ColorArg, Commands, RunArgs, ServeArgs, TranslateArgs,
};
pub use config::{init_tracing, CliConfig, ColorChoice, ServiceConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use server::{router, AppState};

//! Stepwright CLI: natural-language UI test steps
//!
//! ## Usage
//!
//! ```bash
//! stepwright serve --port 8787                      # Run the translation service
//! stepwright translate -s "Click save" -t screen.json
//! stepwright run -s login.yaml -t screen.json      # Replay or translate a scenario
//! stepwright artifact list
//! ```

use clap::Parser;
use std::future::Future;
use std::process::ExitCode;
use stepwright_cli::{
    handlers::{execute_artifact, execute_run, execute_serve, execute_translate},
    init_tracing, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Serve(args) => block_on(execute_serve(&config, &args)),
        Commands::Translate(args) => block_on(execute_translate(&config, &args)),
        Commands::Run(args) => block_on(execute_run(&config, &args)).map(|_| ()),
        Commands::Artifact(args) => execute_artifact(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn block_on<T>(future: impl Future<Output = CliResult<T>>) -> CliResult<T> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create tokio runtime: {e}")))?;
    rt.block_on(future)
}

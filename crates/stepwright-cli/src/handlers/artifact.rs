//! `artifact` command handlers

use stepwright::{Artifact, ArtifactStore, Scenario};

use crate::commands::{ArtifactArgs, ArtifactCommand};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;

/// Execute an artifact subcommand
pub fn execute_artifact(config: &CliConfig, args: &ArtifactArgs) -> CliResult<()> {
    let store = ArtifactStore::new(&args.artifact_dir);
    let reporter = Reporter::from_config(config);

    match &args.command {
        ArtifactCommand::Show { name } => {
            let artifact = require(&store, name)?;
            println!("{}", artifact.to_json()?);
        }
        ArtifactCommand::Check { name, scenario } => {
            let scenario = Scenario::from_path(scenario)?;
            check(&store, name, &scenario)?;
            reporter.success(&format!("{name}: artifact matches {} steps", scenario.steps.len()));
        }
        ArtifactCommand::List => {
            let names = store.list()?;
            if names.is_empty() {
                reporter.info(&format!("no artifacts in {}", store.root().display()));
            }
            for name in names {
                println!("{name}");
            }
        }
        ArtifactCommand::Delete { name } => {
            if store.delete(name)? {
                reporter.success(&format!("deleted {}", store.path_for(name).display()));
            } else {
                reporter.warning(&format!("no artifact named '{name}'"));
            }
        }
    }
    Ok(())
}

fn require(store: &ArtifactStore, name: &str) -> CliResult<Artifact> {
    store
        .load(name)?
        .ok_or_else(|| CliError::invalid_argument(format!("no artifact named '{name}'")))
}

/// Fail unless the saved artifact can replay `scenario`
pub fn check(store: &ArtifactStore, name: &str, scenario: &Scenario) -> CliResult<()> {
    match store.load(name)? {
        Some(artifact) if artifact.is_valid(&scenario.steps) => Ok(()),
        _ => Err(CliError::StaleArtifact {
            name: name.to_string(),
        }),
    }
}

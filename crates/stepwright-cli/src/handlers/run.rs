//! `run` command handler
//!
//! Orchestrates: load scenario -> load snapshot into an in-memory UI ->
//! replay or translate -> print report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stepwright::{ArtifactStore, MemoryUi, Orchestrator, RunOptions, Scenario, ScenarioReport};

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::backend::{load_tree, step_translator};
use crate::output::Reporter;

/// Execute the run command. Fails when the scenario does not complete.
pub async fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<ScenarioReport> {
    let scenario = Scenario::from_path(&args.scenario)?;
    let mut ui = MemoryUi::new(load_tree(&args.tree)?);

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let options = if args.regenerate {
        RunOptions::regenerate()
    } else {
        RunOptions::default()
    };
    let mut orchestrator = Orchestrator::new(ArtifactStore::new(&args.artifact_dir))
        .with_options(options.with_cancel(cancel));

    // The backend is only needed when the artifact cannot be replayed.
    if orchestrator.needs_translation(&scenario) {
        let translator =
            step_translator(args.service.as_deref(), Duration::from_secs(args.timeout_secs))?;
        orchestrator = orchestrator.with_translator(translator);
    }

    let report = orchestrator.run(&scenario, &mut ui).await;
    interrupt.abort();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        Reporter::from_config(config).report(&report);
    }

    if report.is_success() {
        Ok(report)
    } else {
        Err(CliError::scenario_failed(failure_message(&report)))
    }
}

fn failure_message(report: &ScenarioReport) -> String {
    match (&report.failure, &report.error) {
        (Some(failure), _) => format!("{}: {failure}", report.test_name),
        (None, Some(error)) => format!("{}: {error}", report.test_name),
        (None, None) => report.test_name.clone(),
    }
}

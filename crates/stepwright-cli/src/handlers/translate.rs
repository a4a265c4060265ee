//! `translate` command handler
//!
//! One-off translation of a single step against a snapshot file.

use std::time::Duration;

use stepwright::{Action, StepTranslator};

use crate::commands::TranslateArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::backend::{load_tree, model_translator};
use crate::output::Reporter;

/// Execute the translate command
pub async fn execute_translate(config: &CliConfig, args: &TranslateArgs) -> CliResult<()> {
    let tree = load_tree(&args.tree)?;
    let (_, translator) = model_translator(Duration::from_secs(args.timeout_secs))?;
    let actions = translator.translate(&args.step, &tree).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&actions)?);
    } else {
        let reporter = Reporter::from_config(config);
        reporter.success(&format!("{} → {} action(s)", args.step, actions.len()));
        for line in numbered(&actions) {
            reporter.line(&line);
        }
    }
    Ok(())
}

/// `  1. Click on stableTag="save"` lines
fn numbered(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let rationale = action
                .locator
                .rationale
                .as_deref()
                .map(|r| format!("  ({r})"))
                .unwrap_or_default();
            format!("  {}. {action}{rationale}", i + 1)
        })
        .collect()
}

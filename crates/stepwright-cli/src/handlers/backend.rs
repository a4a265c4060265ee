//! Snapshot loading and translator construction shared by the handlers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use stepwright::{LanguageModel, ProviderConfig, SemanticTree, StepTranslator, Translator};

use crate::error::{CliError, CliResult};

/// Read a semantics tree snapshot from a JSON file
pub fn load_tree(path: &Path) -> CliResult<SemanticTree> {
    if !path.exists() {
        return Err(CliError::invalid_argument(format!(
            "Snapshot file not found: {}",
            path.display()
        )));
    }
    let json = std::fs::read_to_string(path)?;
    Ok(SemanticTree::from_json(&json)?)
}

/// Model-backed translator for the env-selected provider
#[cfg(feature = "llm")]
pub fn model_translator(
    timeout: Duration,
) -> CliResult<(ProviderConfig, Translator<Box<dyn LanguageModel>>)> {
    let provider = ProviderConfig::from_env()?;
    tracing::info!(backend = %provider.label(), "using model backend");
    let translator = Translator::new(provider.build(timeout)).with_timeout(timeout);
    Ok((provider, translator))
}

/// Model-backed translator for the env-selected provider
#[cfg(not(feature = "llm"))]
pub fn model_translator(
    _timeout: Duration,
) -> CliResult<(ProviderConfig, Translator<Box<dyn LanguageModel>>)> {
    Err(stepwright::ConfigError::BackendsDisabled.into())
}

/// Translator for `run`: the remote service when `service` is set, else the
/// env-selected model backend
pub fn step_translator(
    service: Option<&str>,
    timeout: Duration,
) -> CliResult<Arc<dyn StepTranslator>> {
    match service {
        #[cfg(feature = "llm")]
        Some(url) => {
            tracing::info!(url, "using remote translation service");
            Ok(Arc::new(stepwright::RemoteTranslator::new(url, timeout)))
        }
        #[cfg(not(feature = "llm"))]
        Some(_) => Err(stepwright::ConfigError::BackendsDisabled.into()),
        None => {
            let (_, translator) = model_translator(timeout)?;
            Ok(Arc::new(translator))
        }
    }
}

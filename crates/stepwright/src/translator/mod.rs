//! Natural-language step translation.
//!
//! A [`Translator`] sends one step plus the rendered semantic tree to a
//! [`LanguageModel`], parses the reply into [`Action`]s, and then upgrades any
//! locator whose target carries a more stable identifier than the one the
//! model picked. It never caches; wrap it in
//! [`CachedTranslator`](crate::cache::CachedTranslator) for that.

pub mod prompt;
pub mod response;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::action::Action;
use crate::llm::LanguageModel;
use crate::resolver::{resolve, stable_locator_for};
use crate::result::TranslationError;
use crate::tree::SemanticTree;

pub use prompt::{build_user_prompt, SYSTEM_INSTRUCTION};
pub use response::{parse_model_output, CommandResponse, CommandStatus, ErrorKind};

/// Default bound on one model call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that turns a step and a snapshot into actions
#[async_trait]
pub trait StepTranslator: Send + Sync {
    /// Translate one step against the current screen
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError>;

    /// Short description for logs and artifacts
    fn describe(&self) -> String {
        "translator".to_string()
    }
}

#[async_trait]
impl<T: StepTranslator + ?Sized> StepTranslator for Arc<T> {
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError> {
        (**self).translate(step, snapshot).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<T: StepTranslator + ?Sized> StepTranslator for Box<T> {
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError> {
        (**self).translate(step, snapshot).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Model-backed translator
#[derive(Debug, Clone)]
pub struct Translator<M> {
    model: M,
    timeout: Duration,
    enforce_stability: bool,
}

impl<M: LanguageModel> Translator<M> {
    /// Create a translator with the default timeout and stability enforcement on
    pub const fn new(model: M) -> Self {
        Self {
            model,
            timeout: DEFAULT_TIMEOUT,
            enforce_stability: true,
        }
    }

    /// Override the per-call timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Keep locators exactly as the model returned them
    #[must_use]
    pub const fn without_stability_enforcement(mut self) -> Self {
        self.enforce_stability = false;
        self
    }

    /// The wrapped model
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Configured timeout
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<M: LanguageModel> StepTranslator for Translator<M> {
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError> {
        let user_prompt = build_user_prompt(step, snapshot);
        let start = Instant::now();

        let raw = match tokio::time::timeout(
            self.timeout,
            self.model.complete(SYSTEM_INSTRUCTION, &user_prompt),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(TranslationError::backend(e.to_string())),
            Err(_) => {
                return Err(TranslationError::backend(format!(
                    "{} did not answer within {}s",
                    self.model.name(),
                    self.timeout.as_secs_f32()
                )))
            }
        };

        let actions = parse_model_output(&raw)?;
        tracing::info!(
            step = step.trim(),
            model = %self.model.name(),
            actions = actions.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "step translated"
        );

        if self.enforce_stability {
            Ok(enforce_stability(actions, snapshot))
        } else {
            Ok(actions)
        }
    }

    fn describe(&self) -> String {
        self.model.name()
    }
}

/// Upgrade locators to the most stable unique identifier of their target.
///
/// Only upgrades happen. Locators that do not resolve uniquely in `snapshot`
/// are returned untouched.
#[must_use]
pub fn enforce_stability(actions: Vec<Action>, snapshot: &SemanticTree) -> Vec<Action> {
    actions
        .into_iter()
        .map(|action| upgrade_locator(action, snapshot))
        .collect()
}

fn upgrade_locator(mut action: Action, snapshot: &SemanticTree) -> Action {
    let Ok(node) = resolve(&action.locator, snapshot) else {
        return action;
    };
    let Some(stable) = stable_locator_for(snapshot, node) else {
        return action;
    };
    if !stable.strategy.outranks(action.locator.strategy) {
        return action;
    }
    tracing::debug!(from = %action.locator, to = %stable, "locator upgraded");
    let reason = stable.rationale.clone().unwrap_or_default();
    action.locator = stable.with_rationale(format!(
        "upgraded from {}: {reason}",
        action.locator.strategy
    ));
    action
}

//! Scenario orchestration.
//!
//! A run moves through explicit states:
//!
//! ```text
//! Idle -> Loading -> CachedReplay ----> Completed
//!                 \-> LiveTranslation -> Completed
//!                       (any error) --> Failed
//! ```
//!
//! A valid artifact is replayed without touching the translator. Otherwise
//! each step is translated against a fresh snapshot, executed, and the full
//! translation is persisted once every step has passed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Step};
use crate::adapter::UiAdapter;
use crate::artifact::{Artifact, ArtifactStore};
use crate::executor::Executor;
use crate::result::{ScenarioError, ScenarioFileError};
use crate::translator::StepTranslator;

/// An ordered list of natural-language steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name; also names the artifact file
    pub name: String,
    /// Step descriptions in execution order
    pub steps: Vec<String>,
}

impl Scenario {
    /// Create a scenario; step descriptions are trimmed
    #[must_use]
    pub fn new<S: Into<String>>(name: impl Into<String>, steps: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(|s| trim_owned(s.into())).collect(),
        }
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioFileError> {
        let scenario: Self = serde_yaml_ng::from_str(yaml).map_err(|e| ScenarioFileError::Parse {
            message: e.to_string(),
        })?;
        scenario.validate()
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ScenarioFileError> {
        let scenario: Self = serde_json::from_str(json).map_err(|e| ScenarioFileError::Parse {
            message: e.to_string(),
        })?;
        scenario.validate()
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> Result<Self, ScenarioFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScenarioFileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    fn validate(mut self) -> Result<Self, ScenarioFileError> {
        self.steps = self.steps.into_iter().map(trim_owned).collect();
        if self.name.trim().is_empty() {
            return Err(ScenarioFileError::Invalid {
                message: "scenario name is empty".to_string(),
            });
        }
        if self.steps.is_empty() {
            return Err(ScenarioFileError::Invalid {
                message: format!("scenario '{}' has no steps", self.name),
            });
        }
        if let Some(i) = self.steps.iter().position(|s| s.trim().is_empty()) {
            return Err(ScenarioFileError::Invalid {
                message: format!("step {i} of '{}' is empty", self.name),
            });
        }
        Ok(self)
    }
}

fn trim_owned(text: String) -> String {
    let trimmed = text.trim();
    if trimmed.len() == text.len() {
        text
    } else {
        trimmed.to_string()
    }
}

/// How the actions of a run were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    /// Replayed from a valid artifact
    CachedReplay,
    /// Translated step by step
    LiveTranslation,
}

/// Final outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioOutcome {
    /// Every step passed
    Completed,
    /// The run stopped at an error
    Failed,
}

/// Where and why a run stopped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
    /// Zero-based step index; `None` for scenario-level failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    /// Step description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Action being executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Locator of that action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    /// Error text
    pub cause: String,
}

impl StepFailure {
    fn at_step(index: usize, description: &str) -> Self {
        Self {
            step_index: Some(index),
            description: Some(description.to_string()),
            ..Self::default()
        }
    }

    fn on_action(mut self, action: &Action) -> Self {
        self.action = Some(action.to_string());
        self.locator = Some(action.locator.to_string());
        self
    }

    fn caused_by(mut self, error: &ScenarioError) -> Self {
        self.cause = error.to_string();
        self
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.step_index {
            write!(f, "step {}", index + 1)?;
            if let Some(ref description) = self.description {
                write!(f, " '{description}'")?;
            }
            if let Some(ref action) = self.action {
                write!(f, " at {action}")?;
            }
            write!(f, ": ")?;
        }
        f.write_str(&self.cause)
    }
}

/// Summary of one scenario run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Scenario name
    pub test_name: String,
    /// Replay or live translation; `None` if the run never left loading
    pub mode: Option<RunMode>,
    /// Completed or failed
    pub outcome: ScenarioOutcome,
    /// Steps whose actions all passed
    pub steps_executed: usize,
    /// Actions performed or asserted
    pub actions_executed: usize,
    /// Translator invocations made by this run
    pub translator_calls: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Artifact written by a live run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
    /// Failure details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// The error that ended the run
    #[serde(skip)]
    pub error: Option<ScenarioError>,
}

impl ScenarioReport {
    fn new(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            mode: None,
            outcome: ScenarioOutcome::Failed,
            steps_executed: 0,
            actions_executed: 0,
            translator_calls: 0,
            duration_ms: 0,
            artifact_path: None,
            failure: None,
            error: None,
        }
    }

    /// Whether every step passed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ScenarioOutcome::Completed
    }
}

/// Orchestrator state, threaded through the run loop
#[derive(Debug)]
pub enum ScenarioState {
    /// Not started
    Idle,
    /// Checking for a reusable artifact
    Loading,
    /// Replaying stored actions
    CachedReplay {
        /// Artifact being replayed
        artifact: Artifact,
        /// Next step to execute
        next_step: usize,
    },
    /// Translating and executing step by step
    LiveTranslation {
        /// Steps that already passed
        completed: Vec<Step>,
        /// Next step to translate
        next_step: usize,
    },
    /// All steps passed
    Completed,
    /// The run stopped
    Failed {
        /// What ended the run
        error: ScenarioError,
        /// Where it happened
        failure: StepFailure,
    },
}

impl ScenarioState {
    /// State name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Loading => "Loading",
            Self::CachedReplay { .. } => "CachedReplay",
            Self::LiveTranslation { .. } => "LiveTranslation",
            Self::Completed => "Completed",
            Self::Failed { .. } => "Failed",
        }
    }

    fn failed(error: ScenarioError, failure: StepFailure) -> Self {
        let failure = failure.caused_by(&error);
        Self::Failed { error, failure }
    }
}

/// Per-run switches
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Ignore any stored artifact and translate again
    pub force_regenerate: bool,
    /// Set to `true` to stop the run before its next action
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    /// Options that always translate
    #[must_use]
    pub fn regenerate() -> Self {
        Self {
            force_regenerate: true,
            cancel: None,
        }
    }

    /// Attach a cancellation flag
    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Runs scenarios from cache or through the translator
pub struct Orchestrator {
    store: ArtifactStore,
    translator: Option<Arc<dyn StepTranslator>>,
    executor: Executor,
    options: RunOptions,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .field("translator", &self.translator.as_ref().map(|t| t.describe()))
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator without a translator; only valid artifacts can run
    #[must_use]
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            translator: None,
            executor: Executor::new(),
            options: RunOptions::default(),
        }
    }

    /// Attach a translator for live runs
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn StepTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replace the executor
    #[must_use]
    pub const fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = executor;
        self
    }

    /// Set run options
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// The artifact store
    #[must_use]
    pub const fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Whether running `scenario` would call the translator
    #[must_use]
    pub fn needs_translation(&self, scenario: &Scenario) -> bool {
        self.options.force_regenerate
            || self
                .store
                .load_valid(&scenario.name, &scenario.steps)
                .is_none()
    }

    /// Run a scenario to completion or first failure
    pub async fn run<A>(&self, scenario: &Scenario, adapter: &mut A) -> ScenarioReport
    where
        A: UiAdapter + ?Sized,
    {
        let start = Instant::now();
        let mut report = ScenarioReport::new(&scenario.name);
        let mut state = ScenarioState::Idle;

        loop {
            let from = state.name();
            state = match state {
                ScenarioState::Idle => ScenarioState::Loading,
                ScenarioState::Loading => self.load(scenario, &mut report),
                ScenarioState::CachedReplay {
                    artifact,
                    next_step,
                } => {
                    self.replay_step(artifact, next_step, adapter, &mut report)
                        .await
                }
                ScenarioState::LiveTranslation {
                    completed,
                    next_step,
                } => {
                    self.translate_step(scenario, completed, next_step, adapter, &mut report)
                        .await
                }
                ScenarioState::Completed => {
                    report.outcome = ScenarioOutcome::Completed;
                    break;
                }
                ScenarioState::Failed { error, failure } => {
                    tracing::warn!(test_name = %scenario.name, %failure, "scenario failed");
                    report.outcome = ScenarioOutcome::Failed;
                    report.failure = Some(failure);
                    report.error = Some(error);
                    break;
                }
            };
            if from != state.name() {
                tracing::info!(test_name = %scenario.name, from, to = state.name(), "scenario state");
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    fn load(&self, scenario: &Scenario, report: &mut ScenarioReport) -> ScenarioState {
        let artifact = if self.options.force_regenerate {
            tracing::info!(test_name = %scenario.name, "regeneration forced");
            None
        } else {
            self.store.load_valid(&scenario.name, &scenario.steps)
        };
        match artifact {
            Some(artifact) => {
                report.mode = Some(RunMode::CachedReplay);
                ScenarioState::CachedReplay {
                    artifact,
                    next_step: 0,
                }
            }
            None => {
                report.mode = Some(RunMode::LiveTranslation);
                ScenarioState::LiveTranslation {
                    completed: Vec::with_capacity(scenario.steps.len()),
                    next_step: 0,
                }
            }
        }
    }

    async fn replay_step<A>(
        &self,
        artifact: Artifact,
        index: usize,
        adapter: &mut A,
        report: &mut ScenarioReport,
    ) -> ScenarioState
    where
        A: UiAdapter + ?Sized,
    {
        let Some(step) = artifact.steps.get(index) else {
            return ScenarioState::Completed;
        };
        if let Err(failed) = self.run_actions(index, step, adapter, report).await {
            return failed;
        }
        report.steps_executed += 1;
        ScenarioState::CachedReplay {
            artifact,
            next_step: index + 1,
        }
    }

    async fn translate_step<A>(
        &self,
        scenario: &Scenario,
        mut completed: Vec<Step>,
        index: usize,
        adapter: &mut A,
        report: &mut ScenarioReport,
    ) -> ScenarioState
    where
        A: UiAdapter + ?Sized,
    {
        let Some(description) = scenario.steps.get(index) else {
            return self.persist(scenario, completed, report);
        };
        let here = || StepFailure::at_step(index, description);

        let Some(ref translator) = self.translator else {
            let error = ScenarioError::TranslatorUnavailable {
                name: scenario.name.clone(),
            };
            return ScenarioState::failed(error, here());
        };
        if self.options.is_cancelled() {
            return ScenarioState::failed(ScenarioError::Cancelled, here());
        }

        let snapshot = match adapter.capture_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(source) => {
                return ScenarioState::failed(ScenarioError::Snapshot { step: index, source }, here())
            }
        };
        report.translator_calls += 1;
        let actions = match translator.translate(description, &snapshot).await {
            Ok(actions) => actions,
            Err(source) => {
                return ScenarioState::failed(
                    ScenarioError::Translation {
                        step: index,
                        source,
                    },
                    here(),
                )
            }
        };
        tracing::debug!(step = index, actions = actions.len(), "step translated");

        let step = Step::new(description.clone(), actions);
        if let Err(failed) = self.run_actions(index, &step, adapter, report).await {
            return failed;
        }
        report.steps_executed += 1;
        completed.push(step);
        ScenarioState::LiveTranslation {
            completed,
            next_step: index + 1,
        }
    }

    async fn run_actions<A>(
        &self,
        index: usize,
        step: &Step,
        adapter: &mut A,
        report: &mut ScenarioReport,
    ) -> Result<(), ScenarioState>
    where
        A: UiAdapter + ?Sized,
    {
        for action in &step.actions {
            let here = || StepFailure::at_step(index, &step.description).on_action(action);
            if self.options.is_cancelled() {
                return Err(ScenarioState::failed(ScenarioError::Cancelled, here()));
            }
            if let Err(source) = self.executor.execute(action, adapter).await {
                let error = ScenarioError::Execution {
                    step: index,
                    source,
                };
                return Err(ScenarioState::failed(error, here()));
            }
            report.actions_executed += 1;
        }
        Ok(())
    }

    fn persist(
        &self,
        scenario: &Scenario,
        steps: Vec<Step>,
        report: &mut ScenarioReport,
    ) -> ScenarioState {
        let mut artifact = Artifact::new(scenario.name.clone(), steps);
        if let Some(ref translator) = self.translator {
            artifact = artifact.with_provider(translator.describe());
        }
        match self.store.save(&scenario.name, &artifact) {
            Ok(path) => {
                report.artifact_path = Some(path);
                ScenarioState::Completed
            }
            Err(e) => ScenarioState::failed(e.into(), StepFailure::default()),
        }
    }
}

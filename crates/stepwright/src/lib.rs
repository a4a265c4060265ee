//! Stepwright: natural-language UI test steps, translated once and replayed.
//!
//! A scenario is a list of plain-English steps ("Type text 'Hello World'",
//! "Click button"). On the first run each step is sent, together with the
//! current semantics tree, to a language model that answers with structured
//! [`Action`]s. The actions run through a [`UiAdapter`] and, once every step
//! has passed, are saved as an [`Artifact`]. Later runs with unchanged steps
//! replay the artifact without calling the model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   valid artifact   ┌──────────┐
//! │ Scenario │───────────────────►│ Executor │──► UiAdapter
//! └────┬─────┘                    └────▲─────┘
//!      │ stale / missing               │ actions
//!      ▼                               │
//! ┌──────────┐  prompt   ┌───────────────┐
//! │ Snapshot │──────────►│  Translator   │──► LanguageModel
//! └──────────┘           │ (+ cache)     │
//!                        └───────────────┘
//! ```
//!
//! Locators prefer the most stable identifier available on the target:
//! stable tag, then accessibility description, then hierarchy path, then
//! visible text.

#![warn(missing_docs)]

pub mod action;
pub mod adapter;
pub mod artifact;
pub mod cache;
pub mod executor;
pub mod llm;
pub mod locator;
pub mod memory_ui;
pub mod orchestrator;
#[cfg(feature = "llm")]
pub mod remote;
pub mod resolver;
pub mod result;
pub mod translator;
pub mod tree;
pub mod wire;

pub use action::{Action, ActionKind, Step};
pub use adapter::UiAdapter;
pub use artifact::{Artifact, ArtifactStore};
pub use cache::{fingerprint, CacheStats, CachedTranslator, TranslationCache};
pub use executor::Executor;
pub use llm::{ConfigError, LanguageModel, LlmError, Provider, ProviderConfig};
pub use locator::{HierarchyPath, Locator, LocatorStrategy};
pub use memory_ui::MemoryUi;
pub use orchestrator::{
    Orchestrator, RunMode, RunOptions, Scenario, ScenarioOutcome, ScenarioReport, ScenarioState,
    StepFailure,
};
#[cfg(feature = "llm")]
pub use remote::RemoteTranslator;
pub use resolver::{compute_path, resolve, stable_locator_for};
pub use result::{
    ArtifactError, ExecutionError, ResolutionError, ScenarioError, ScenarioFileError,
    TranslationError, UiError,
};
pub use translator::{StepTranslator, Translator};
pub use tree::{Bounds, NodeId, NodeSpec, SemanticNode, SemanticTree};

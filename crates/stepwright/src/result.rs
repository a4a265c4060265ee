//! Result and error types for Stepwright.
//!
//! Each pipeline stage owns one error enum. [`ScenarioError`] aggregates them
//! at the orchestrator boundary, where every error except a failed artifact
//! load ends the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::ActionKind;
use crate::tree::NodeId;

/// Errors produced while translating a natural-language step
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// Transport failure, timeout, or an unparseable model reply
    #[error("Backend error: {message}")]
    BackendError {
        /// Error message
        message: String,
    },

    /// The reply was JSON but did not match the command schema
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message
        message: String,
    },

    /// The backend found several candidate nodes for one locator
    #[error("Ambiguous match: {message}")]
    AmbiguousMatch {
        /// Error message
        message: String,
    },

    /// The backend found no node matching the step
    #[error("No match: {message}")]
    NoMatch {
        /// Error message
        message: String,
    },
}

impl TranslationError {
    /// Create a backend error
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::BackendError {
            message: message.into(),
        }
    }

    /// Create an invalid response error
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

/// Errors produced while resolving a locator against a tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// No node matched
    #[error("No element matches {locator}")]
    NotFound {
        /// Locator description
        locator: String,
    },

    /// More than one node matched
    #[error("{count} elements match {locator}")]
    Ambiguous {
        /// Locator description
        locator: String,
        /// Number of matching nodes
        count: usize,
    },

    /// Malformed hierarchy path or an index outside the live tree
    #[error("Invalid hierarchy path '{path}': {reason}")]
    InvalidPath {
        /// The offending path
        path: String,
        /// What went wrong
        reason: String,
    },
}

/// Errors produced by a UI adapter primitive
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UiError {
    /// The target does not support this operation
    #[error("Operation not supported: {operation}")]
    Unsupported {
        /// Operation name
        operation: String,
    },

    /// The node id does not exist in the live UI
    #[error("Stale node {id}")]
    StaleNode {
        /// Node id from an earlier snapshot
        id: NodeId,
    },

    /// Any other framework failure
    #[error("{message}")]
    Failed {
        /// Error message
        message: String,
    },
}

impl UiError {
    /// Create an unsupported-operation error
    #[must_use]
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

/// Errors produced while executing an action
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// The locator did not resolve to exactly one node; nothing was performed
    #[error("Locator {locator} failed: {reason}")]
    LocatorFailed {
        /// Locator description
        locator: String,
        /// Resolution failure
        #[source]
        reason: ResolutionError,
    },

    /// The UI operation or assertion failed
    #[error("{kind} failed: {cause}")]
    ActionFailed {
        /// Action kind that failed
        kind: ActionKind,
        /// Underlying cause
        cause: String,
    },
}

/// Errors produced by the artifact store
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file exists but could not be read or parsed
    #[error("Failed to load artifact {}: {message}", path.display())]
    LoadFailed {
        /// Artifact path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Artifact could not be written
    #[error("Failed to save artifact {}: {message}", path.display())]
    SaveFailed {
        /// Artifact path
        path: PathBuf,
        /// Error message
        message: String,
    },
}

/// Errors loading a scenario definition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScenarioFileError {
    /// File could not be read
    #[error("Failed to read scenario {}: {message}", path.display())]
    Read {
        /// Scenario path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// File is not valid YAML or JSON for a scenario
    #[error("Failed to parse scenario: {message}")]
    Parse {
        /// Error message
        message: String,
    },

    /// Parsed, but unusable (empty name or no steps)
    #[error("Invalid scenario: {message}")]
    Invalid {
        /// Error message
        message: String,
    },
}

/// Errors that end a scenario run in the `Failed` state
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Step translation failed
    #[error("Step {step} translation failed: {source}")]
    Translation {
        /// Zero-based step index
        step: usize,
        /// Underlying error
        #[source]
        source: TranslationError,
    },

    /// Action execution failed
    #[error("Step {step} execution failed: {source}")]
    Execution {
        /// Zero-based step index
        step: usize,
        /// Underlying error
        #[source]
        source: ExecutionError,
    },

    /// Snapshot capture failed before translation
    #[error("Step {step} snapshot capture failed: {source}")]
    Snapshot {
        /// Zero-based step index
        step: usize,
        /// Underlying error
        #[source]
        source: UiError,
    },

    /// Persisting the regenerated artifact failed
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Live translation was needed but no translator was configured
    #[error("Scenario '{name}' needs translation but no translator is configured")]
    TranslatorUnavailable {
        /// Scenario name
        name: String,
    },

    /// The run was cancelled between actions
    #[error("Scenario run cancelled")]
    Cancelled,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_error_display() {
        let err = TranslationError::backend("timeout after 30s");
        assert!(err.to_string().contains("Backend error"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_ambiguous_resolution_display() {
        let err = ResolutionError::Ambiguous {
            locator: "text=\"OK\"".to_string(),
            count: 2,
        };
        assert_eq!(err.to_string(), "2 elements match text=\"OK\"");
    }

    #[test]
    fn test_locator_failed_keeps_source() {
        let err = ExecutionError::LocatorFailed {
            locator: "stableTag=\"submit\"".to_string(),
            reason: ResolutionError::NotFound {
                locator: "stableTag=\"submit\"".to_string(),
            },
        };
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("No element"));
    }

    #[test]
    fn test_scenario_error_from_artifact() {
        let err: ScenarioError = ArtifactError::SaveFailed {
            path: PathBuf::from("/tmp/a.json"),
            message: "disk full".to_string(),
        }
        .into();
        assert!(err.to_string().contains("disk full"));
    }
}

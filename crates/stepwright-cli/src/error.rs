//! Error types for the CLI

use stepwright::{ArtifactError, ConfigError, ScenarioFileError, TranslationError};
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario ran but did not complete
    #[error("Scenario failed: {message}")]
    ScenarioFailed {
        /// Error message
        message: String,
    },

    /// Saved artifact no longer matches the scenario
    #[error("Artifact '{name}' is stale or missing; run the scenario to regenerate it")]
    StaleArtifact {
        /// Scenario name
        name: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Model backend selection failed
    #[error(transparent)]
    Provider(#[from] ConfigError),

    /// Translation failed
    #[error(transparent)]
    Translation(#[from] TranslationError),

    /// Artifact store failure
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Scenario file could not be used
    #[error(transparent)]
    ScenarioFile(#[from] ScenarioFileError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a scenario failure error
    #[must_use]
    pub fn scenario_failed(message: impl Into<String>) -> Self {
        Self::ScenarioFailed {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

//! Client for a running translation service.

use std::time::Duration;

use async_trait::async_trait;

use crate::action::Action;
use crate::artifact::Artifact;
use crate::result::TranslationError;
use crate::translator::{CommandResponse, StepTranslator};
use crate::tree::SemanticTree;
use crate::wire::{GenerateCommandRequest, HealthResponse, SaveArtifactRequest, SaveArtifactResponse};

/// [`StepTranslator`] that forwards steps to `POST /generate-command`
#[derive(Debug, Clone)]
pub struct RemoteTranslator {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteTranslator {
    /// Client for the service at `base_url` (e.g. `http://127.0.0.1:8787`)
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Service base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, TranslationError> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| TranslationError::backend(e.to_string()))?;
        resp.json()
            .await
            .map_err(|e| TranslationError::invalid_response(e.to_string()))
    }

    /// `POST /save-artifact`
    pub async fn save_artifact(
        &self,
        artifact: &Artifact,
    ) -> Result<SaveArtifactResponse, TranslationError> {
        let body = SaveArtifactRequest {
            test_name: artifact.test_name.clone(),
            artifact_json: artifact
                .to_json()
                .map_err(|e| TranslationError::invalid_response(e.to_string()))?,
        };
        let resp = self
            .client
            .post(self.url("/save-artifact"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::backend(e.to_string()))?;
        resp.json()
            .await
            .map_err(|e| TranslationError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl StepTranslator for RemoteTranslator {
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError> {
        let body = GenerateCommandRequest {
            user_step: step.to_string(),
            screen_hierarchy: snapshot.to_json(),
        };
        let resp = self
            .client
            .post(self.url("/generate-command"))
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::backend(e.to_string()))?;

        // Translation failures come back as an Error envelope with a 4xx/5xx
        // status, so the body is parsed regardless of status.
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TranslationError::backend(e.to_string()))?;
        let envelope: CommandResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                TranslationError::invalid_response(e.to_string())
            } else {
                TranslationError::backend(format!("service returned {status}: {text}"))
            }
        })?;
        envelope.into_result()
    }

    fn describe(&self) -> String {
        format!("remote({})", self.base_url)
    }
}

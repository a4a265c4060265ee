//! Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LanguageModel, LlmError};

/// One text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Text content.
    #[serde(default)]
    pub text: String,
}

/// A content block (system instruction, user turn, or candidate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`; absent on system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

/// Sampling configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Output MIME type; `application/json` forces JSON output.
    pub response_mime_type: String,
}

/// `generateContent` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// System instruction.
    pub system_instruction: Content,
    /// Conversation turns.
    pub contents: Vec<Content>,
    /// Sampling configuration.
    pub generation_config: GenerationConfig,
}

/// One candidate reply.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Reply content.
    pub content: Option<Content>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Candidate replies.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    #[must_use]
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    base_url: String,
    client: reqwest::Client,
    model: String,
    api_key: String,
}

impl GeminiModel {
    /// Create a backend for the given model and key.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Endpoint for this model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Build the request body for one completion.
    pub fn build_request(&self, system_instruction: &str, user_prompt: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content::text(None, system_instruction),
            contents: vec![Content::text(Some("user"), user_prompt)],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let request = self.build_request(system_instruction, user_prompt);
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: GenerateResponse = resp.json().await?;
        response.first_text().ok_or_else(|| LlmError::EmptyResponse {
            provider: self.name(),
        })
    }

    fn name(&self) -> String {
        format!("gemini/{}", self.model)
    }
}

//! Language-model backends.
//!
//! The translator talks to a model through one operation,
//! [`LanguageModel::complete`]. Two hosted providers implement it:
//! - **OpenAI-compatible** chat completions ([`openai::OpenAiModel`])
//! - **Gemini** `generateContent` ([`gemini::GeminiModel`])
//!
//! [`provider::ProviderConfig`] picks one from the environment at startup.

use async_trait::async_trait;

#[cfg(feature = "llm")]
pub mod gemini;
#[cfg(feature = "llm")]
pub mod openai;
pub mod provider;

#[cfg(feature = "llm")]
pub use gemini::GeminiModel;
#[cfg(feature = "llm")]
pub use openai::{ChatMessage, ChatRequest, ChatResponse, OpenAiModel, Role};
pub use provider::{ConfigError, Provider, ProviderConfig};

/// Errors from a model backend.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Server returned an error status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The request did not finish in time.
    #[error("Request timed out")]
    Timeout,
    /// The reply contained no text.
    #[error("Empty response from {provider}")]
    EmptyResponse {
        /// Provider name.
        provider: String,
    },
}

#[cfg(feature = "llm")]
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        Self::Http(err.to_string())
    }
}

/// A hosted model that completes a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `user_prompt` under `system_instruction`, returning raw text.
    async fn complete(&self, system_instruction: &str, user_prompt: &str)
        -> Result<String, LlmError>;

    /// Provider and model, for logs and artifacts.
    fn name(&self) -> String;
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        (**self).complete(system_instruction, user_prompt).await
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

#[async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for std::sync::Arc<M> {
    async fn complete(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        (**self).complete(system_instruction, user_prompt).await
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

//! Backend selection from the environment.

use std::fmt;
#[cfg(feature = "llm")]
use std::time::Duration;

#[cfg(feature = "llm")]
use super::{GeminiModel, LanguageModel, OpenAiModel};

/// Credential variable for the OpenAI-compatible backend
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Base URL override for the OpenAI-compatible backend
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
/// Model override for the OpenAI-compatible backend
pub const OPENAI_MODEL: &str = "STEPWRIGHT_OPENAI_MODEL";
/// Credential variable for the Gemini backend
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Model override for the Gemini backend
pub const GEMINI_MODEL: &str = "STEPWRIGHT_GEMINI_MODEL";

/// Default base URL of the OpenAI-compatible backend
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Default OpenAI model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Gemini API base URL
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini model
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration errors raised before any backend call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Neither credential variable is set
    #[error("No model credentials: set OPENAI_API_KEY or GEMINI_API_KEY")]
    MissingCredentials,

    /// Hosted backends were compiled out
    #[error("Model backends are disabled in this build (enable the `llm` feature)")]
    BackendsDisabled,
}

/// Hosted model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI-compatible chat completions
    OpenAi,
    /// Gemini generateContent
    Gemini,
}

impl Provider {
    /// Short name used in logs, health output and artifacts
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved backend settings
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Selected provider
    pub provider: Provider,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Select a provider from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] when neither key is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Select a provider using an arbitrary variable lookup.
    ///
    /// The OpenAI key wins when both keys are present. Empty values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] when neither key is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = get(OPENAI_API_KEY) {
            return Ok(Self {
                provider: Provider::OpenAi,
                api_key,
                model: get(OPENAI_MODEL).unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
                base_url: get(OPENAI_BASE_URL)
                    .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
            });
        }
        if let Some(api_key) = get(GEMINI_API_KEY) {
            return Ok(Self {
                provider: Provider::Gemini,
                api_key,
                model: get(GEMINI_MODEL).unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string()),
                base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
            });
        }
        Err(ConfigError::MissingCredentials)
    }

    /// `provider/model`, as reported by [`super::LanguageModel::name`]
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }

    /// Construct the configured backend
    #[cfg(feature = "llm")]
    #[must_use]
    pub fn build(&self, timeout: Duration) -> Box<dyn LanguageModel> {
        match self.provider {
            Provider::OpenAi => Box::new(OpenAiModel::new(
                &self.base_url,
                &self.model,
                &self.api_key,
                timeout,
            )),
            Provider::Gemini => Box::new(GeminiModel::new(
                &self.base_url,
                &self.model,
                &self.api_key,
                timeout,
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_openai_wins_when_both_set() {
        let config =
            ProviderConfig::from_lookup(lookup(&[(OPENAI_API_KEY, "sk"), (GEMINI_API_KEY, "g")]))
                .unwrap();
        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_gemini_selected_alone() {
        let config = ProviderConfig::from_lookup(lookup(&[
            (GEMINI_API_KEY, "g"),
            (GEMINI_MODEL, "gemini-1.5-pro"),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.label(), "gemini/gemini-1.5-pro");
    }

    #[test]
    fn test_overrides_applied() {
        let config = ProviderConfig::from_lookup(lookup(&[
            (OPENAI_API_KEY, "sk"),
            (OPENAI_BASE_URL, "http://localhost:11434"),
            (OPENAI_MODEL, "llama3"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3");
    }

    #[test]
    fn test_missing_credentials() {
        let err = ProviderConfig::from_lookup(lookup(&[(OPENAI_API_KEY, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredentials);
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig::from_lookup(lookup(&[(OPENAI_API_KEY, "sk-secret")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("redacted"));
    }

    #[cfg(feature = "llm")]
    #[test]
    fn test_build_names_backend() {
        let config = ProviderConfig::from_lookup(lookup(&[(GEMINI_API_KEY, "g")])).unwrap();
        let model = config.build(Duration::from_secs(5));
        assert_eq!(model.name(), "gemini/gemini-1.5-flash");
    }
}

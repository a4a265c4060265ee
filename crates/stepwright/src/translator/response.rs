//! Command envelope returned by the model and by the translation service.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::result::TranslationError;

/// Envelope status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    /// Translation succeeded
    #[serde(rename = "OK", alias = "ok", alias = "Ok")]
    Ok,
    /// Translation failed
    #[serde(rename = "Error", alias = "error", alias = "ERROR")]
    Error,
}

/// Failure category reported alongside an `Error` status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Several candidate nodes
    Ambiguous,
    /// No candidate node
    NoMatch,
    /// Backend or transport failure
    Backend,
    /// Malformed model output
    InvalidResponse,
}

/// `{status:"OK", actions}` or `{status:"Error", message, errorKind?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Outcome
    pub status: CommandStatus,
    /// Actions on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl CommandResponse {
    /// Successful envelope
    #[must_use]
    pub const fn ok(actions: Vec<Action>) -> Self {
        Self {
            status: CommandStatus::Ok,
            actions: Some(actions),
            message: None,
            error_kind: None,
        }
    }

    /// Failure envelope for a translation error
    #[must_use]
    pub fn from_error(error: &TranslationError) -> Self {
        let (kind, message) = match error {
            TranslationError::BackendError { message } => (ErrorKind::Backend, message),
            TranslationError::InvalidResponse { message } => (ErrorKind::InvalidResponse, message),
            TranslationError::AmbiguousMatch { message } => (ErrorKind::Ambiguous, message),
            TranslationError::NoMatch { message } => (ErrorKind::NoMatch, message),
        };
        Self {
            status: CommandStatus::Error,
            actions: None,
            message: Some(message.clone()),
            error_kind: Some(kind),
        }
    }

    /// Convert the envelope into actions or a translation error
    pub fn into_result(self) -> Result<Vec<Action>, TranslationError> {
        match self.status {
            CommandStatus::Ok => {
                let actions = self.actions.ok_or_else(|| {
                    TranslationError::invalid_response("status OK without an actions array")
                })?;
                if actions.is_empty() {
                    return Err(TranslationError::invalid_response("empty actions array"));
                }
                actions
                    .into_iter()
                    .enumerate()
                    .map(|(i, action)| {
                        action.locator.validate().map_err(|e| {
                            TranslationError::invalid_response(format!("action {i}: {e}"))
                        })?;
                        action.normalized().map_err(|e| {
                            TranslationError::invalid_response(format!("action {i}: {e}"))
                        })
                    })
                    .collect()
            }
            CommandStatus::Error => {
                let message = self
                    .message
                    .unwrap_or_else(|| "translator reported an error".to_string());
                Err(classify_error(self.error_kind, message))
            }
        }
    }
}

fn classify_error(kind: Option<ErrorKind>, message: String) -> TranslationError {
    let kind = kind.unwrap_or_else(|| {
        let lower = message.to_lowercase();
        if lower.contains("ambiguous") || lower.contains("multiple") {
            ErrorKind::Ambiguous
        } else {
            ErrorKind::NoMatch
        }
    });
    match kind {
        ErrorKind::Ambiguous => TranslationError::AmbiguousMatch { message },
        ErrorKind::NoMatch => TranslationError::NoMatch { message },
        ErrorKind::Backend => TranslationError::BackendError { message },
        ErrorKind::InvalidResponse => TranslationError::InvalidResponse { message },
    }
}

/// Remove a Markdown code fence wrapped around the JSON object, if any
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_end();
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim()
}

/// Parse raw model output into actions.
///
/// Text that is not JSON at all is a backend failure; JSON that does not fit
/// the envelope schema is an invalid response.
pub fn parse_model_output(raw: &str) -> Result<Vec<Action>, TranslationError> {
    let body = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::backend(format!("model output is not JSON: {e}")))?;
    let envelope: CommandResponse = serde_json::from_value(value)
        .map_err(|e| TranslationError::invalid_response(e.to_string()))?;
    envelope.into_result()
}

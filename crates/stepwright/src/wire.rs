//! JSON bodies of the translation service.
//!
//! Shared by the server (CLI crate) and [`RemoteTranslator`](crate::remote::RemoteTranslator).
//! `POST /generate-command` answers with a
//! [`CommandResponse`](crate::translator::CommandResponse).

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;

/// `POST /generate-command` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCommandRequest {
    /// Natural-language step
    pub user_step: String,
    /// JSON-serialized semantic tree
    pub screen_hierarchy: String,
}

/// `POST /save-artifact` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveArtifactRequest {
    /// Scenario name
    pub test_name: String,
    /// Artifact document as a JSON string
    pub artifact_json: String,
}

/// `POST /save-artifact` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveArtifactResponse {
    /// Whether the artifact was written
    pub success: bool,
    /// Written path, on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok` when the service answers
    pub status: String,
    /// Backend provider
    pub provider: String,
    /// Backend model
    pub model: String,
    /// Live translation cache entries
    pub cache_entries: usize,
    /// Cache hits since the last reset
    #[serde(default)]
    pub cache_hits: u64,
    /// Cache misses since the last reset
    #[serde(default)]
    pub cache_misses: u64,
}

impl HealthResponse {
    /// Healthy response for a provider and cache state
    #[must_use]
    pub fn ok(provider: impl Into<String>, model: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            status: "ok".to_string(),
            provider: provider.into(),
            model: model.into(),
            cache_entries: stats.entries,
            cache_hits: stats.hits,
            cache_misses: stats.misses,
        }
    }
}

/// `POST /clear-cache` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    /// Entries removed
    pub cleared: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_field_names() {
        let json = r#"{"userStep":"Click OK","screenHierarchy":"{}"}"#;
        let req: GenerateCommandRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_step, "Click OK");
    }

    #[test]
    fn test_health_field_names() {
        let health = HealthResponse::ok("openai", "gpt-4o-mini", CacheStats::default());
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"cacheEntries\":0"));
    }

    #[test]
    fn test_save_response_omits_empty_fields() {
        let resp = SaveArtifactResponse {
            success: true,
            path: Some("/tmp/a.json".to_string()),
            message: None,
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"success":true,"path":"/tmp/a.json"}"#
        );
    }
}

//! HTTP translation service.
//!
//! Wraps a [`StepTranslator`] behind the JSON endpoints described in
//! [`stepwright::wire`]. Translations go through a process-wide
//! [`TranslationCache`] that lives as long as the server.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use stepwright::translator::CommandResponse;
use stepwright::wire::{
    ClearCacheResponse, GenerateCommandRequest, HealthResponse, SaveArtifactRequest,
    SaveArtifactResponse,
};
use stepwright::{Artifact, ArtifactStore, SemanticTree, StepTranslator, TranslationCache, TranslationError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::CliResult;

/// Shared state of the translation service
#[derive(Clone)]
pub struct AppState {
    translator: Arc<dyn StepTranslator>,
    cache: Arc<TranslationCache>,
    store: ArtifactStore,
    provider: String,
    model: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("translator", &self.translator.describe())
            .field("cache_entries", &self.cache.len())
            .field("store", &self.store)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .finish()
    }
}

impl AppState {
    /// State for a translator that already consults `cache`.
    ///
    /// `/clear-cache` and `/health` act on `cache`, so it must be the same
    /// instance the translator was built with.
    #[must_use]
    pub fn new(
        translator: Arc<dyn StepTranslator>,
        cache: Arc<TranslationCache>,
        store: ArtifactStore,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            cache,
            store,
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// The process cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-command", post(generate_command))
        .route("/save-artifact", post(save_artifact))
        .route("/clear-cache", post(clear_cache))
        .with_state(Arc::new(state))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is interrupted
pub async fn serve(addr: std::net::SocketAddr, state: AppState) -> CliResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, translator = %state.translator.describe(), "translation service listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    info!("translation service stopped");
    Ok(())
}

/// HTTP status for a failed translation
#[must_use]
pub const fn status_for(error: &TranslationError) -> StatusCode {
    match error {
        TranslationError::AmbiguousMatch { .. } | TranslationError::NoMatch { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TranslationError::BackendError { .. } | TranslationError::InvalidResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(
        &state.provider,
        &state.model,
        state.cache.stats(),
    ))
}

async fn generate_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateCommandRequest>,
) -> Response {
    let snapshot = match SemanticTree::from_json(&request.screen_hierarchy) {
        Ok(tree) => tree,
        Err(e) => {
            let error =
                TranslationError::invalid_response(format!("screenHierarchy is not a tree: {e}"));
            return (StatusCode::BAD_REQUEST, Json(CommandResponse::from_error(&error)))
                .into_response();
        }
    };

    match state.translator.translate(&request.user_step, &snapshot).await {
        Ok(actions) => (StatusCode::OK, Json(CommandResponse::ok(actions))).into_response(),
        Err(error) => {
            warn!(step = %request.user_step, %error, "translation failed");
            (status_for(&error), Json(CommandResponse::from_error(&error))).into_response()
        }
    }
}

async fn save_artifact(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveArtifactRequest>,
) -> Response {
    let mut artifact = match Artifact::from_json(&request.artifact_json) {
        Ok(artifact) => artifact,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SaveArtifactResponse {
                    success: false,
                    path: None,
                    message: Some(format!("artifactJson is not an artifact: {e}")),
                }),
            )
                .into_response();
        }
    };

    artifact.test_name.clone_from(&request.test_name);
    match state.store.save(&request.test_name, &artifact) {
        Ok(path) => (
            StatusCode::OK,
            Json(SaveArtifactResponse {
                success: true,
                path: Some(path.display().to_string()),
                message: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SaveArtifactResponse {
                success: false,
                path: None,
                message: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearCacheResponse> {
    let cleared = state.cache.clear();
    info!(cleared, "translation cache cleared");
    Json(ClearCacheResponse { cleared })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use stepwright::{Action, CachedTranslator, Locator, NodeSpec};
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Answers `Click <tag>` with a tap on that tag, anything else with NoMatch
    #[derive(Default)]
    struct TagTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StepTranslator for TagTranslator {
        async fn translate(
            &self,
            step: &str,
            snapshot: &SemanticTree,
        ) -> Result<Vec<Action>, TranslationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match step.strip_prefix("Click ") {
                Some(tag) if snapshot.find_by_tag(tag).is_some() => {
                    Ok(vec![Action::click(Locator::stable_tag(tag))])
                }
                _ => Err(TranslationError::NoMatch {
                    message: format!("nothing matches '{step}'"),
                }),
            }
        }
    }

    struct Fixture {
        app: Router,
        inner: Arc<TagTranslator>,
        cache: Arc<TranslationCache>,
        dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let inner = Arc::new(TagTranslator::default());
        let cache = Arc::new(TranslationCache::new());
        let translator = CachedTranslator::new(Arc::clone(&inner), Arc::clone(&cache));
        let state = AppState::new(
            Arc::new(translator),
            Arc::clone(&cache),
            ArtifactStore::new(dir.path()),
            "openai",
            "gpt-4o-mini",
        );
        Fixture {
            app: router(state),
            inner,
            cache,
            dir,
        }
    }

    fn screen_json() -> String {
        NodeSpec::new("Column")
            .child(NodeSpec::new("Button").tag("save").text("Save"))
            .build()
            .to_json()
    }

    fn post_json(uri: &str, body: &impl serde::Serialize) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn body_of<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    mod health_tests {
        use super::*;

        #[tokio::test]
        async fn test_health_reports_backend() {
            let fx = fixture();
            let response = fx
                .app
                .oneshot(Request::get("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let health: HealthResponse = body_of(response).await;
            assert_eq!(health.status, "ok");
            assert_eq!(health.provider, "openai");
            assert_eq!(health.model, "gpt-4o-mini");
            assert_eq!(health.cache_entries, 0);
        }
    }

    mod generate_command_tests {
        use super::*;

        fn request(step: &str, screen: String) -> GenerateCommandRequest {
            GenerateCommandRequest {
                user_step: step.to_string(),
                screen_hierarchy: screen,
            }
        }

        #[tokio::test]
        async fn test_success_envelope() {
            let fx = fixture();
            let response = fx
                .app
                .oneshot(post_json("/generate-command", &request("Click save", screen_json())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let envelope: CommandResponse = body_of(response).await;
            let actions = envelope.into_result().unwrap();
            assert_eq!(actions, vec![Action::click(Locator::stable_tag("save"))]);
        }

        #[tokio::test]
        async fn test_repeated_request_hits_cache() {
            let fx = fixture();
            for _ in 0..2 {
                let response = fx
                    .app
                    .clone()
                    .oneshot(post_json("/generate-command", &request("Click save", screen_json())))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
            }
            assert_eq!(fx.inner.calls.load(Ordering::SeqCst), 1);
            assert_eq!(fx.cache.stats().hits, 1);
        }

        #[tokio::test]
        async fn test_no_match_is_error_envelope() {
            let fx = fixture();
            let response = fx
                .app
                .oneshot(post_json("/generate-command", &request("Click cancel", screen_json())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let envelope: CommandResponse = body_of(response).await;
            let err = envelope.into_result().unwrap_err();
            assert!(matches!(err, TranslationError::NoMatch { .. }));
        }

        #[tokio::test]
        async fn test_bad_hierarchy_is_bad_request() {
            let fx = fixture();
            let response = fx
                .app
                .oneshot(post_json(
                    "/generate-command",
                    &request("Click save", "not a tree".to_string()),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let envelope: CommandResponse = body_of(response).await;
            assert!(matches!(
                envelope.into_result().unwrap_err(),
                TranslationError::InvalidResponse { .. }
            ));
            assert_eq!(fx.inner.calls.load(Ordering::SeqCst), 0);
        }
    }

    mod artifact_tests {
        use super::*;

        #[tokio::test]
        async fn test_save_artifact_writes_store() {
            let fx = fixture();
            let artifact = Artifact::new("login", vec![]);
            let body = SaveArtifactRequest {
                test_name: "login".to_string(),
                artifact_json: artifact.to_json().unwrap(),
            };
            let response = fx.app.oneshot(post_json("/save-artifact", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let saved: SaveArtifactResponse = body_of(response).await;
            assert!(saved.success);
            assert!(fx.dir.path().join("login.json").exists());
        }

        #[tokio::test]
        async fn test_save_artifact_uses_request_name() {
            let fx = fixture();
            let artifact = Artifact::new("draft", vec![]);
            let body = SaveArtifactRequest {
                test_name: "login flow".to_string(),
                artifact_json: artifact.to_json().unwrap(),
            };
            let response = fx.app.oneshot(post_json("/save-artifact", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let stored = ArtifactStore::new(fx.dir.path())
                .load("login flow")
                .unwrap()
                .unwrap();
            assert_eq!(stored.test_name, "login flow");
        }

        #[tokio::test]
        async fn test_save_rejects_malformed_artifact() {
            let fx = fixture();
            let body = SaveArtifactRequest {
                test_name: "login".to_string(),
                artifact_json: "{}".to_string(),
            };
            let response = fx.app.oneshot(post_json("/save-artifact", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let saved: SaveArtifactResponse = body_of(response).await;
            assert!(!saved.success);
            assert!(saved.message.is_some());
        }
    }

    mod clear_cache_tests {
        use super::*;

        #[tokio::test]
        async fn test_clear_cache_reports_count() {
            let fx = fixture();
            fx.cache.insert("k".to_string(), vec![]);
            let response = fx
                .app
                .oneshot(
                    Request::post("/clear-cache")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            let cleared: ClearCacheResponse = body_of(response).await;
            assert_eq!(cleared.cleared, 1);
            assert!(fx.cache.is_empty());
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&TranslationError::backend("x")), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&TranslationError::AmbiguousMatch {
                message: "two".to_string()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

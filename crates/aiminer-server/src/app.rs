//! Router, handlers and the serve loop.
//!
//! | Route | Answer |
//! |---|---|
//! | `GET /` | service status and gateway readiness |
//! | `GET /health` | 200 when the gateway is ready, 503 otherwise |
//! | `POST /api/brain` | run the pipeline on `{"brain_data": {...}}` |
//!
//! Every gateway call blocks, so handlers hop onto the blocking pool before
//! touching the pipeline.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use aiminer_contracts::{document::StateDocument, task::Task};
use aiminer_core::BrainPipeline;

use crate::{
    config::ServerConfig,
    error::{ApiError, ServerError, ServerResult},
};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BrainPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<BrainPipeline>) -> Self {
        Self { pipeline }
    }

    async fn readiness(&self) -> (bool, String) {
        let pipeline = self.pipeline.clone();
        tokio::task::spawn_blocking(move || {
            (pipeline.gateway_ready(), pipeline.gateway_description())
        })
        .await
        .unwrap_or_else(|_| (false, "inference gateway".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct BrainRequest {
    pub brain_data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct BrainResponse {
    pub brain_data: StateDocument,
    pub processing_time_ms: u64,
    pub task_added: bool,
    pub task: Option<Task>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/brain", post(handle_brain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener, resolving `config.host` when it is a hostname.
pub async fn bind(config: &ServerConfig) -> ServerResult<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| ServerError::Bind {
            addr: config.address(),
            reason: e.to_string(),
        })
}

/// Bind `config`'s address and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> ServerResult<()> {
    let listener = bind(config).await?;
    let addr = listener
        .local_addr()
        .map_or_else(|_| config.address(), |a| a.to_string());

    info!(
        addr = %addr,
        gateway = %state.pipeline.gateway_description(),
        "brain service listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Serve { reason: e.to_string() })?;

    info!("brain service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn handle_index(State(state): State<AppState>) -> impl IntoResponse {
    let (ready, gateway) = state.readiness().await;
    Json(serde_json::json!({
        "status": "running",
        "gateway_ready": ready,
        "gateway": gateway,
    }))
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let (ready, gateway) = state.readiness().await;
    if ready {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "healthy", "gateway": gateway })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unhealthy",
                "reason": "Inference gateway not ready",
                "gateway": gateway,
            })),
        )
    }
}

async fn handle_brain(
    State(state): State<AppState>,
    body: Result<Json<BrainRequest>, JsonRejection>,
) -> Result<Json<BrainResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::unprocessable(format!("Invalid request body: {e}")))?;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process_value(request.brain_data))
        .await
        .map_err(|e| ApiError::internal(format!("Processing failed: {e}")))??;

    Ok(Json(BrainResponse {
        brain_data: outcome.document,
        processing_time_ms: outcome.processing_time_ms,
        task_added: outcome.task_added,
        task: outcome.task,
    }))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    };

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use aiminer_contracts::{
        error::{BrainError, BrainResult},
        inference::InferenceRequest,
    };
    use aiminer_core::{traits::InferenceGateway, BrainPipeline};
    use aiminer_prompt::TemplateCompiler;
    use aiminer_verify::{CommandParser, SchemaDocumentDecoder};

    use super::{bind, build_router, AppState};
    use crate::config::ServerConfig;

    // ── Helpers ──────────────────────────────────────────────────────────────

    /// A gateway with scripted readiness and reply that counts infer calls.
    struct ScriptedGateway {
        ready: Arc<AtomicBool>,
        reply: Result<&'static str, &'static str>,
        calls: Arc<AtomicU32>,
    }

    impl InferenceGateway for ScriptedGateway {
        fn is_ready(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }

        fn infer(&self, _request: &InferenceRequest) -> BrainResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(str::to_string)
                .map_err(|reason| BrainError::Inference { reason: reason.to_string() })
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    struct Fixture {
        router: Router,
        calls: Arc<AtomicU32>,
    }

    fn fixture(ready: bool, reply: Result<&'static str, &'static str>) -> Fixture {
        let calls = Arc::new(AtomicU32::new(0));
        let gateway = ScriptedGateway {
            ready: Arc::new(AtomicBool::new(ready)),
            reply,
            calls: calls.clone(),
        };
        let pipeline = BrainPipeline::new(
            Box::new(TemplateCompiler::default()),
            Box::new(gateway),
            Box::new(CommandParser::default()),
        )
        .with_decoder(Box::new(SchemaDocumentDecoder::new().unwrap()));

        Fixture {
            router: build_router(AppState::new(Arc::new(pipeline))),
            calls,
        }
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(router, request).await
    }

    async fn post(router: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/brain")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // ── Status endpoints ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_index_reports_gateway() {
        let f = fixture(true, Ok("WAIT"));
        let (status, body) = get(f.router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "running", "gateway_ready": true, "gateway": "scripted" }));
    }

    #[tokio::test]
    async fn test_health_reflects_gateway_readiness() {
        let (status, body) = get(fixture(true, Ok("WAIT")).router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("healthy"));

        let (status, body) = get(fixture(false, Ok("WAIT")).router, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!("unhealthy"));
        assert_eq!(body["reason"], json!("Inference gateway not ready"));
    }

    // ── /api/brain ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_brain_adds_task() {
        let f = fixture(true, Ok("MOVE_TO 10 64 -5"));
        let (status, body) = post(
            f.router,
            json!({ "brain_data": { "rules": "Explore", "tasks": [ { "id": 3 }, { "id": 7 } ] } }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task_added"], json!(true));
        assert_eq!(body["task"]["id"], json!(8));
        assert_eq!(body["task"]["type"], json!("MOVE_TO"));
        assert_eq!(body["task"]["parameters"], json!({ "x": 10, "y": 64, "z": -5 }));
        assert_eq!(body["brain_data"]["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(body["brain_data"]["rules"], json!("Explore"));
        assert!(body["processing_time_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_brain_unparseable_completion_returns_document_unchanged() {
        let f = fixture(true, Ok("Let me think about that"));
        let brain_data = json!({ "memory": { "b": 1, "a": 2 }, "tasks": [], "extra": [1, 2] });

        let (status, body) = post(f.router, json!({ "brain_data": brain_data.clone() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task_added"], json!(false));
        assert_eq!(body["task"], Value::Null);
        assert_eq!(body["brain_data"], brain_data);
    }

    #[tokio::test]
    async fn test_brain_gateway_not_ready_is_503_without_inference() {
        let f = fixture(false, Ok("WAIT"));
        let (status, body) = post(f.router, json!({ "brain_data": {} })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().unwrap().contains("not ready"));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_brain_invalid_document_is_422() {
        let f = fixture(true, Ok("WAIT"));
        let (status, body) = post(f.router, json!({ "brain_data": { "tasks": "none" } })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("/tasks"));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_brain_missing_brain_data_is_422() {
        let f = fixture(true, Ok("WAIT"));
        let (status, body) = post(f.router, json!({ "state": {} })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_brain_inference_failure_is_500() {
        let f = fixture(true, Err("model crashed"));
        let (status, body) = post(f.router, json!({ "brain_data": {} })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Processing failed"));
        assert!(detail.contains("model crashed"));
    }

    /// A chat log exactly as the game plugin writes it, with clock-text
    /// timestamps and explicit nulls, comes back untouched.
    #[tokio::test]
    async fn test_brain_accepts_plugin_document() {
        let f = fixture(true, Ok("WAIT"));
        let brain_data = json!({
            "tasks": [],
            "vision": {
                "chat": [ { "timestamp": "12:34:56", "player": "Steve", "message": "hi" } ],
                "blockVision": null
            },
            "memory": { "current_position": { "x": 1, "y": 64, "z": 2 } },
            "rules": { "description": "Help", "availableTasks": ["WAIT"] }
        });

        let (status, body) = post(f.router, json!({ "brain_data": brain_data.clone() })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["task_added"], json!(true));
        let returned = &body["brain_data"];
        assert_eq!(returned["vision"], brain_data["vision"]);
        assert_eq!(returned["tasks"][0]["type"], json!("WAIT"));
        let keys: Vec<&String> = returned.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["tasks", "vision", "memory", "rules"]);
    }

    #[tokio::test]
    async fn test_bind_resolves_hostnames() {
        let config = ServerConfig { host: "localhost".to_string(), port: 0 };
        let listener = bind(&config).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}

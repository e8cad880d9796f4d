//! # Veracity Server
//!
//! Thin axum boundary over [`veracity_core`]: one POST endpoint that runs
//! the fact-check pipeline, a health check, an agents placeholder, and an
//! optional static mount for a local front-end build.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use veracity_core::error::PipelineError;
use veracity_core::pipeline::FactCheckPipeline;

/// Directory served as the front-end, when it exists.
const PUBLIC_DIR: &str = "public";

/// Shared application state.
pub struct AppState {
    /// The fact-check orchestrator; stateless across requests.
    pub pipeline: FactCheckPipeline,
}

type SharedState = Arc<AppState>;

// === API Types ===

#[derive(Deserialize)]
pub struct FactCheckRequest {
    article: Option<String>,
}

#[derive(Serialize)]
pub struct FactCheckResponse {
    report: String,
    status: String,
}

/// Error carried back to the caller with its HTTP status.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ArticleTooShort | PipelineError::NoClaims => {
                Self::bad_request(err.to_string())
            }
            PipelineError::Internal(message) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Fact-check failed: {message}"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// === API Handlers ===

/// Run the fact-check pipeline on an article.
async fn fact_check(
    State(state): State<SharedState>,
    Json(request): Json<FactCheckRequest>,
) -> Result<Json<FactCheckResponse>, ApiError> {
    let article = request
        .article
        .ok_or_else(|| ApiError::bad_request("Missing 'article' field."))?;

    let report = state.pipeline.run(&article).await?;

    Ok(Json(FactCheckResponse {
        report,
        status: "completed".to_string(),
    }))
}

/// Health check.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Placeholder: the agent runtime owns agent listing.
async fn list_agents() -> Json<serde_json::Value> {
    Json(json!({ "message": "Agent listing is handled by the agent runtime." }))
}

// === Router ===

/// Build the application router.
///
/// The static front-end mount is added only when a local `public/`
/// directory exists at startup.
pub fn router(state: SharedState) -> Router {
    let app = Router::new()
        .route("/api/fact-check", post(fact_check))
        .route("/api/health", get(health))
        .route("/agents", get(list_agents));

    let app = if Path::new(PUBLIC_DIR).is_dir() {
        app.fallback_service(ServeDir::new(PUBLIC_DIR).append_index_html_on_directories(true))
    } else {
        app
    };

    app.with_state(state)
}

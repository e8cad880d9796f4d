//! HTTP boundary tests: the router is driven with `tower::ServiceExt`
//! oneshot requests over a scripted agent runtime, covering the status-code
//! contract end to end.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use veracity_core::error::RuntimeError;
use veracity_core::pipeline::{FactCheckPipeline, PipelineConfig};
use veracity_core::runtime::{AgentRuntime, AgentSpec};
use veracity_server::{router, AppState};

const FIXED_REPORT: &str = "# Fact-Check Report\n\nThe article holds up.";

/// Scripted runtime: extraction answers with a canned claim array, every
/// verification says TRUE, synthesis returns a fixed markdown report.
struct ScriptedRuntime {
    extractor_reply: String,
    total_calls: AtomicUsize,
}

impl ScriptedRuntime {
    fn new(extractor_reply: &str) -> Self {
        Self {
            extractor_reply: extractor_reply.to_string(),
            total_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn start(&self, _spec: AgentSpec) -> Result<(), RuntimeError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send(
        &self,
        name: &str,
        _message: &str,
        _timeout: Duration,
    ) -> Result<String, RuntimeError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if name.starts_with("claim_extractor") {
            Ok(self.extractor_reply.clone())
        } else if name.starts_with("fact_checker") {
            Ok("Verdict: TRUE\nConfidence: High".to_string())
        } else {
            Ok(FIXED_REPORT.to_string())
        }
    }

    async fn stop(&self, _name: &str) -> Result<(), RuntimeError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn app(runtime: Arc<ScriptedRuntime>) -> axum::Router {
    let state = Arc::new(AppState {
        pipeline: FactCheckPipeline::new(runtime, PipelineConfig::default()),
    });
    router(state)
}

fn fact_check_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/fact-check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn article_of_len(len: usize) -> String {
    "a".repeat(len)
}

#[tokio::test]
async fn test_fact_check_happy_path_returns_report_and_status() {
    let runtime = Arc::new(ScriptedRuntime::new(
        r#"[{"claim": "X happened", "type": "event", "context": "para 2"}]"#,
    ));
    let response = app(Arc::clone(&runtime))
        .oneshot(fact_check_request(
            serde_json::json!({ "article": article_of_len(200) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["report"], FIXED_REPORT);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_short_article_is_400_with_no_agent_calls() {
    let runtime = Arc::new(ScriptedRuntime::new("[]"));
    let response = app(Arc::clone(&runtime))
        .oneshot(fact_check_request(
            serde_json::json!({ "article": article_of_len(10) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("too short"));
    assert_eq!(runtime.total_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_article_field_is_400() {
    let runtime = Arc::new(ScriptedRuntime::new("[]"));
    let response = app(runtime)
        .oneshot(fact_check_request(serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_extracted_claims_is_400_and_stops_the_pipeline() {
    let runtime = Arc::new(ScriptedRuntime::new("[]"));
    let response = app(Arc::clone(&runtime))
        .oneshot(fact_check_request(
            serde_json::json!({ "article": article_of_len(200) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No verifiable claims found in the article.");

    // Extractor start + send + stop only; verification and synthesis agents
    // never ran.
    assert_eq!(runtime.total_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_health_endpoint() {
    let runtime = Arc::new(ScriptedRuntime::new("[]"));
    let response = app(runtime)
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_agents_placeholder_endpoint() {
    let runtime = Arc::new(ScriptedRuntime::new("[]"));
    let response = app(runtime)
        .oneshot(
            Request::builder()
                .uri("/agents")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("runtime"));
}

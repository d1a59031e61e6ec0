use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stemtutor_orchestration::OrchestrationSettings;
use stemtutor_server::{
    api::app_router,
    build_state,
    config::{Config, ProviderKeys},
};
use tower::ServiceExt;

/// Router with no provider credentials: only canned content is available.
fn offline_app() -> Router {
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        keys: ProviderKeys::default(),
        orchestration: OrchestrationSettings::default(),
    };
    app_router(build_state(&config), &config)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthz_works() {
    let response = offline_app()
        .oneshot(Request::builder().uri("/api/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn solve_without_providers_serves_canned_solution() {
    let (status, body) = post_json(
        offline_app(),
        "/api/solve",
        json!({"problem": "2x + 3 = 7", "model": "deepseek"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["degraded"], true);
    assert_eq!(body["providerUsed"], "fallback");
    assert_eq!(body["capability"], "solve");
    assert!(body["result"]["content"]
        .as_str()
        .unwrap()
        .starts_with("# Solution: 2x + 3 = 7"));
}

#[tokio::test]
async fn formulas_without_providers_serves_builtin_sheet() {
    let (status, body) = post_json(
        offline_app(),
        "/api/formulas",
        json!({"subject": "Physics", "topic": "Mechanics"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["result"]["content"].as_str().unwrap().contains("F = ma"));
}

#[tokio::test]
async fn blank_problem_is_bad_request() {
    let (status, body) = post_json(offline_app(), "/api/solve", json!({"problem": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "Field 'problem' cannot be empty");
}

#[tokio::test]
async fn image_without_providers_is_unavailable() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate-image",
        json!({"prompt": "a lever and fulcrum"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 503);
}

#[tokio::test]
async fn transcription_without_provider_is_unavailable() {
    let (status, _) = post_json(
        offline_app(),
        "/api/transcribe-audio",
        json!({"audio": "UklGRg==", "format": "wav"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn ai_health_without_providers_is_unavailable() {
    let response = offline_app()
        .oneshot(Request::builder().uri("/api/ai-health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["overallStatus"], false);
    assert_eq!(body["providers"], json!({}));
}

#[tokio::test]
async fn solve_with_voice_without_provider_is_unavailable() {
    let (status, body) = post_json(
        offline_app(),
        "/api/solve-with-voice",
        json!({"audio": "UklGRg==", "subject": "Physics", "showSteps": false}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 503);
}

#[tokio::test]
async fn diagram_with_blank_concept_is_bad_request() {
    let (status, body) = post_json(
        offline_app(),
        "/api/generate-diagram",
        json!({"concept": " ", "subject": "Physics"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Field 'concept' cannot be empty");
}

#[tokio::test]
async fn problem_illustration_without_providers_is_unavailable() {
    let (status, _) = post_json(
        offline_app(),
        "/api/generate-problem-illustration",
        json!({"problem": "A block slides down a frictionless incline", "subject": "Physics"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

//! Integration tests for the health check endpoint

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use vibecurator_api::cache::RecommendCache;
use vibecurator_api::config::Config;
use vibecurator_api::routes::{health::health_router, AppState};

fn test_state() -> AppState {
    let _guard = common::EnvGuard::new(&[("DEMO_MODE".to_string(), "true".to_string())]);
    AppState {
        config: Arc::new(Config::from_env().unwrap()),
        catalogue: None,
        audio_meta: None,
        vocabulary_loaded: false,
        audio_loaded: false,
        audio_model_type: None,
        engine: None,
        cache: Arc::new(RecommendCache::connect("redis://127.0.0.1:1/0")),
    }
}

#[tokio::test]
async fn health_endpoint_reports_degraded_without_catalogue() {
    let app = health_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["meta_full_loaded"], false);
    assert_eq!(json["demo_mode"], true);
    assert!(json["engine_version"].is_string());
}

#[tokio::test]
async fn nonexistent_route_returns_404() {
    let app = health_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! Health check HTTP route handler
//!
//! - `GET /health` - reports which resources loaded and whether the
//!   recommendation engine is serving.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::models::HealthResponse;
use crate::routes::AppState;

pub fn health_router(state: AppState) -> Router {
    Router::new().route("/", get(health)).with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let engine_cfg = state.config.engine();

    let meta_full_loaded = state.catalogue.is_some();
    let meta_full_count = state.catalogue.as_ref().map(|c| c.len()).unwrap_or(0);
    let meta_audio_loaded = state.audio_meta.is_some();
    let meta_audio_count = state.audio_meta.as_ref().map(|c| c.len()).unwrap_or(0);

    let redis_connected = state.cache.ping().await;

    let response = HealthResponse {
        status: if meta_full_loaded { "ok" } else { "degraded" },
        engine_version: engine_cfg.engine_version.clone(),
        audio_model: engine_cfg.audio_model.clone(),
        demo_mode: engine_cfg.demo_mode,
        meta_full_loaded,
        meta_full_count,
        meta_audio_loaded,
        meta_audio_count,
        item2vec_loaded: state.vocabulary_loaded,
        audio_loaded: state.audio_loaded,
        audio_model_type: state.audio_model_type.clone(),
        redis_connected,
    };

    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RecommendCache;
    use crate::config::Config;
    use crate::routes::EnvGuard;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let _guard = EnvGuard::set("DEMO_MODE", "true");
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
    async fn degraded_status_when_catalogue_missing() {
        let app = health_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["meta_full_loaded"], false);
    }
}

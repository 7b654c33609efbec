//! Recommendation HTTP route handler
//!
//! - `GET /recommend?seed_id=&k=` - ranked recommendations for a seed track,
//!   read-through cached per `(engine_version, audio_model, seed_id, k)`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::cache::make_recommend_cache_key;
use crate::engine::EngineError;
use crate::error::{ApiError, ApiResult};
use crate::models::{CachedRecommendation, RecommendResponse};
use crate::routes::AppState;

pub fn recommend_router(state: AppState) -> Router {
    Router::new().route("/recommend", get(recommend)).with_state(state)
}

#[derive(Debug, Deserialize)]
struct RecommendParams {
    seed_id: i64,
    k: Option<usize>,
}

async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> ApiResult<Json<RecommendResponse>> {
    let engine = state.engine.as_ref().ok_or(ApiError::EngineUninitialized)?;
    let engine_cfg = state.config.engine();
    let k = params.k.unwrap_or(engine_cfg.default_k).clamp(1, 100);

    let cache_key = make_recommend_cache_key(&engine_cfg.engine_version, &engine_cfg.audio_model, params.seed_id, k);

    if let Some(cached) = state.cache.get_json::<CachedRecommendation>(&cache_key).await {
        return Ok(Json(RecommendResponse {
            engine_version: engine_cfg.engine_version.clone(),
            audio_model: engine_cfg.audio_model.clone(),
            cached: true,
            method: cached.method,
            seed: cached.seed,
            items: cached.items,
        }));
    }

    let result = engine.recommend(params.seed_id, k).map_err(|err| match err {
        EngineError::SeedNotFound(id) => ApiError::SeedNotFound(id),
        EngineError::SeedUnknownToCf(id) => ApiError::SeedUnknownToCf(id),
        EngineError::CfGenerationFailed => ApiError::CfGenerationFailed,
    })?;

    let to_cache = CachedRecommendation {
        method: result.method.to_string(),
        seed: result.seed.clone(),
        items: result.items.clone(),
    };
    state
        .cache
        .set_json(&cache_key, &to_cache, engine_cfg.cache_ttl_sec)
        .await;

    Ok(Json(RecommendResponse {
        engine_version: engine_cfg.engine_version.clone(),
        audio_model: engine_cfg.audio_model.clone(),
        cached: false,
        method: result.method.to_string(),
        seed: result.seed,
        items: result.items,
    }))
}

//! Track lookup and search HTTP route handlers
//!
//! - `GET /songs/{id}` - fetch a single track's metadata
//! - `GET /search` - substring search over the catalogue

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{SearchResponse, SongItem, SongResponse};
use crate::routes::AppState;

pub fn songs_router(state: AppState) -> Router {
    Router::new()
        .route("/songs/:id", get(get_song))
        .route("/search", get(search))
        .with_state(state)
}

async fn get_song(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<SongResponse>> {
    let catalogue = state.catalogue.as_ref().ok_or(ApiError::EngineUninitialized)?;
    let track = catalogue.lookup(id).ok_or(ApiError::SeedNotFound(id))?;

    Ok(Json(SongResponse {
        song: SongItem {
            song_id: track.id,
            song_name: track.name.clone(),
            artist: track.display_artist.clone(),
            genre: track.primary_genre.clone(),
            issue_year: track.year,
        },
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    limit: Option<usize>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let catalogue = state.catalogue.as_ref().ok_or(ApiError::EngineUninitialized)?;
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let items: Vec<SongItem> = catalogue
        .search(&params.q, limit)
        .into_iter()
        .map(|track| SongItem {
            song_id: track.id,
            song_name: track.name.clone(),
            artist: track.display_artist.clone(),
            genre: track.primary_genre.clone(),
            issue_year: track.year,
        })
        .collect();

    Ok(Json(SearchResponse {
        query: params.q,
        total: items.len(),
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RecommendCache;
    use crate::catalogue::CatalogueRegistry;
    use crate::config::Config;
    use crate::routes::EnvGuard;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(catalogue: Option<CatalogueRegistry>) -> AppState {
        let _guard = EnvGuard::set("DEMO_MODE", "true");
        AppState {
            config: Arc::new(Config::from_env().unwrap()),
            catalogue: catalogue.map(Arc::new),
            audio_meta: None,
            vocabulary_loaded: false,
            audio_loaded: false,
            audio_model_type: None,
            engine: None,
            cache: Arc::new(RecommendCache::connect("redis://127.0.0.1:1/0")),
        }
    }

    #[tokio::test]
    async fn returns_503_when_catalogue_absent() {
        let app = songs_router(test_state(None));
        let response = app
            .oneshot(Request::builder().uri("/songs/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_id() {
        let catalogue = CatalogueRegistry::load_from_json_for_test(r#"[{"id": 1, "song_name": "A"}]"#);
        let app = songs_router(test_state(Some(catalogue)));
        let response = app
            .oneshot(Request::builder().uri("/songs/999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let catalogue = CatalogueRegistry::load_from_json_for_test(
            r#"[
                {"id": 1, "song_name": "Rain Song"},
                {"id": 2, "song_name": "Rain Drops"},
                {"id": 3, "song_name": "Sunshine"}
            ]"#,
        );
        let app = songs_router(test_state(Some(catalogue)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/search?q=rain&limit=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total"], 1);
    }
}

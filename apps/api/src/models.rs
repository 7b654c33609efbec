//! Wire types returned by the HTTP API.

use serde::{Deserialize, Serialize};

/// The seed track a recommendation was generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedInfo {
    pub song_id: i64,
    pub song_name: String,
    pub artist: String,
    pub genre: String,
}

/// A single recommended track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendItem {
    pub rank: usize,
    pub song_id: i64,
    pub song_name: String,
    pub artist: String,
    pub genre: String,
    pub score: f64,
}

/// Response body for `GET /recommend`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub engine_version: String,
    pub audio_model: String,
    pub cached: bool,
    pub method: String,
    pub seed: SeedInfo,
    pub items: Vec<RecommendItem>,
}

/// The payload actually stored in the cache: everything in
/// `RecommendResponse` except `cached`, `engine_version`, and `audio_model`,
/// which are environment-derived rather than request-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedRecommendation {
    pub method: String,
    pub seed: SeedInfo,
    pub items: Vec<RecommendItem>,
}

/// A track as returned by `/songs/{id}` and `/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongItem {
    pub song_id: i64,
    pub song_name: String,
    pub artist: String,
    pub genre: String,
    pub issue_year: Option<i32>,
}

/// Response body for `GET /songs/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongResponse {
    pub song: SongItem,
}

/// Response body for `GET /search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub items: Vec<SongItem>,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine_version: String,
    pub audio_model: String,
    pub demo_mode: bool,
    pub meta_full_loaded: bool,
    pub meta_full_count: usize,
    pub meta_audio_loaded: bool,
    pub meta_audio_count: usize,
    pub item2vec_loaded: bool,
    pub audio_loaded: bool,
    pub audio_model_type: Option<String>,
    pub redis_connected: bool,
}

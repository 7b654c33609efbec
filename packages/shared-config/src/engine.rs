//! Recommendation engine configuration
//!
//! Scalars that govern the ranking pipeline: which resources to load, how
//! many candidates to carry through each stage, and the re-ranking penalty
//! weights. Defaults mirror the original VibeCurator FastAPI service so a
//! fresh checkout behaves the same way out of the box.

use crate::{get_env_or_default, parse_env, ConfigResult};

/// Recommendation engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine version tag, echoed back in every recommend response
    pub engine_version: String,

    /// Which audio embedding model is active ("myna" or "cnn")
    pub audio_model: String,

    /// Default number of results to return when the caller omits `k`
    pub default_k: usize,

    /// Number of CF candidates to gather before re-ranking
    pub candidate_topn: usize,

    /// Number of candidates carried into the hybrid fusion stage
    pub stage3_candidates: usize,

    /// Weight given to the audio score in hybrid fusion, in [0, 1]
    pub alpha_audio: f64,

    /// Per-artist track count above which the soft penalty kicks in
    pub max_per_artist_soft: usize,

    /// Per-artist track count enforced by the final hardcut
    pub max_per_artist_final: usize,

    /// Score penalty applied per track beyond `max_per_artist_soft`
    pub penalty_per_extra: f64,

    /// Penalty applied to a general-genre mismatch against the seed
    pub offrail_penalty_general: f64,

    /// Penalty applied to a special-genre mismatch against the seed
    pub offrail_penalty_special: f64,

    /// Whether to serve synthetic demo data instead of loading real resources
    pub demo_mode: bool,

    /// Cache TTL for recommend responses, in seconds
    pub cache_ttl_sec: u64,

    /// Path to the primary song metadata JSON (CF candidate filtering)
    pub song_meta_path: String,

    /// Path to the audio-side song metadata JSON, if distinct from the above
    pub song_meta_audio_path: String,

    /// Path to the co-listening vocabulary file
    pub item2vec_path: String,

    /// Path to the Myna audio embedding archive
    pub audio_emb_myna_path: String,

    /// Path to the CNN audio embedding archive
    pub audio_emb_cnn_path: String,
}

impl EngineConfig {
    /// Load engine configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            engine_version: get_env_or_default("ENGINE_VERSION", "stage3_v1_myna"),
            audio_model: get_env_or_default("AUDIO_MODEL", "myna"),
            default_k: parse_env("DEFAULT_K", 20)?,
            candidate_topn: parse_env("CANDIDATE_TOPN", 200)?,
            stage3_candidates: parse_env("STAGE3_CANDIDATES", 200)?,
            alpha_audio: parse_env("ALPHA_AUDIO", 0.3)?,
            max_per_artist_soft: parse_env("MAX_PER_ARTIST_SOFT", 3)?,
            max_per_artist_final: parse_env("MAX_PER_ARTIST_FINAL", 2)?,
            penalty_per_extra: parse_env("PENALTY_PER_EXTRA", 0.05)?,
            offrail_penalty_general: parse_env("OFFRAIL_PENALTY_GENERAL", 0.008)?,
            offrail_penalty_special: parse_env("OFFRAIL_PENALTY_SPECIAL", 0.03)?,
            demo_mode: parse_env("DEMO_MODE", true)?,
            cache_ttl_sec: parse_env("CACHE_TTL_SEC", 900)?,
            song_meta_path: get_env_or_default("SONG_META_PATH", ""),
            song_meta_audio_path: get_env_or_default("SONG_META_AUDIO_PATH", ""),
            item2vec_path: get_env_or_default("ITEM2VEC_PATH", ""),
            audio_emb_myna_path: get_env_or_default("AUDIO_EMB_MYNA_PATH", ""),
            audio_emb_cnn_path: get_env_or_default("AUDIO_EMB_CNN_PATH", ""),
        })
    }

    /// Path to the active audio embedding archive, selected by `audio_model`
    pub fn active_audio_emb_path(&self) -> &str {
        match self.audio_model.as_str() {
            "cnn" => &self.audio_emb_cnn_path,
            _ => &self.audio_emb_myna_path,
        }
    }
}

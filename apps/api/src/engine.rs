//! Recommendation engine: wires the catalogue, co-listening vocabulary, and
//! audio embeddings together into a single `recommend` operation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::AudioEmbeddingBundle;
use crate::catalogue::CatalogueRegistry;
use crate::models::{RecommendItem, SeedInfo};
use crate::rerank::{apply_reranking, Candidate, RerankParams};
use crate::scoring::{batch_cosine_similarity, minmax_normalize};
use crate::vocabulary::CoListeningVocabulary;
use vibecurator_shared_config::EngineConfig;

/// Failure modes the engine can surface. These map 1:1 to the HTTP error
/// kinds the route handlers translate them into.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("seed not found: {0}")]
    SeedNotFound(i64),
    #[error("seed not in collaborative-filtering vocabulary: {0}")]
    SeedUnknownToCf(i64),
    #[error("cf candidate generation failed")]
    CfGenerationFailed,
}

/// The outcome of a successful `recommend` call.
#[derive(Debug)]
pub struct RecommendResult {
    pub seed: SeedInfo,
    pub items: Vec<RecommendItem>,
    pub method: &'static str,
}

/// Parameters the engine needs from configuration, decoupled from the env
/// var loading in [`EngineConfig`] so tests can construct it directly.
#[derive(Debug, Clone, Copy)]
struct EngineParams {
    demo_mode: bool,
    candidate_topn: usize,
    stage3_candidates: usize,
    alpha_audio: f64,
    rerank: RerankParams,
}

impl From<&EngineConfig> for EngineParams {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            demo_mode: cfg.demo_mode,
            candidate_topn: cfg.candidate_topn,
            stage3_candidates: cfg.stage3_candidates,
            alpha_audio: cfg.alpha_audio,
            rerank: RerankParams {
                max_per_artist_soft: cfg.max_per_artist_soft,
                max_per_artist_final: cfg.max_per_artist_final,
                penalty_per_extra: cfg.penalty_per_extra,
                offrail_penalty_general: cfg.offrail_penalty_general,
                offrail_penalty_special: cfg.offrail_penalty_special,
            },
        }
    }
}

pub struct RecommendationEngine {
    catalogue: Arc<CatalogueRegistry>,
    vocabulary: Option<Arc<CoListeningVocabulary>>,
    audio: Option<Arc<AudioEmbeddingBundle>>,
    params: EngineParams,
}

impl RecommendationEngine {
    pub fn new(
        catalogue: Arc<CatalogueRegistry>,
        vocabulary: Option<Arc<CoListeningVocabulary>>,
        audio: Option<Arc<AudioEmbeddingBundle>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            catalogue,
            vocabulary,
            audio,
            params: EngineParams::from(config),
        }
    }

    pub fn recommend(&self, seed_id: i64, k: usize) -> Result<RecommendResult, EngineError> {
        let seed_track = self
            .catalogue
            .lookup(seed_id)
            .ok_or(EngineError::SeedNotFound(seed_id))?;

        let seed_info = SeedInfo {
            song_id: seed_track.id,
            song_name: seed_track.name.clone(),
            artist: seed_track.display_artist.clone(),
            genre: seed_track.primary_genre.clone(),
        };

        if self.params.demo_mode {
            return Ok(self.demo_recommend(seed_id, k, seed_info));
        }

        let seed_primary_genre = first_genre_token(&seed_track.primary_genre);
        let cf_candidates =
            self.get_cf_candidates_with_rerank(seed_id, &seed_primary_genre, self.params.stage3_candidates);

        if cf_candidates.is_empty() {
            let seed_key = seed_id.to_string();
            let known_to_vocab = self
                .vocabulary
                .as_ref()
                .map(|v| v.contains_key(&seed_key))
                .unwrap_or(false);
            return Err(if known_to_vocab {
                EngineError::CfGenerationFailed
            } else {
                EngineError::SeedUnknownToCf(seed_id)
            });
        }

        let candidate_ids: Vec<i64> = cf_candidates.iter().map(|c| c.id).collect();
        let audio_scores = self.compute_audio_scores(seed_id, &candidate_ids);

        let (method, scored_ids): (&'static str, Vec<(i64, f64)>) = if !audio_scores.is_empty() {
            (
                "hybrid",
                self.fuse_hybrid_scores(&cf_candidates, &audio_scores),
            )
        } else {
            (
                "cf_only",
                cf_candidates.iter().map(|c| (c.id, c.score_final)).collect(),
            )
        };

        let by_id: HashMap<i64, &Candidate> = cf_candidates.iter().map(|c| (c.id, c)).collect();
        let items = scored_ids
            .into_iter()
            .take(k)
            .enumerate()
            .filter_map(|(i, (id, score))| {
                by_id.get(&id).map(|cand| RecommendItem {
                    rank: i + 1,
                    song_id: id,
                    song_name: cand.song_name.clone(),
                    artist: cand.display_artist.clone(),
                    genre: cand.primary_genre.clone(),
                    score: round6(score),
                })
            })
            .collect();

        Ok(RecommendResult {
            seed: seed_info,
            items,
            method,
        })
    }

    fn demo_recommend(&self, seed_id: i64, k: usize, seed: SeedInfo) -> RecommendResult {
        let mut candidates: Vec<i64> = self
            .catalogue
            .ids()
            .iter()
            .copied()
            .filter(|&id| id != seed_id)
            .collect();
        candidates.sort_by_key(|&id| (id * 31 + seed_id).rem_euclid(1_000_000));

        let items = candidates
            .into_iter()
            .take(k)
            .enumerate()
            .filter_map(|(i, id)| {
                self.catalogue.lookup(id).map(|track| RecommendItem {
                    rank: i + 1,
                    song_id: id,
                    song_name: track.name.clone(),
                    artist: track.display_artist.clone(),
                    genre: track.primary_genre.clone(),
                    score: round6(1.0 - (i as f64) * 0.01),
                })
            })
            .collect();

        RecommendResult {
            seed,
            items,
            method: "demo",
        }
    }

    fn get_cf_candidates_raw(&self, seed_id: i64, topn: usize) -> Vec<Candidate> {
        let Some(vocab) = &self.vocabulary else {
            return Vec::new();
        };
        let seed_key = seed_id.to_string();
        if !vocab.contains_key(&seed_key) {
            return Vec::new();
        }

        let neighbours = vocab.neighbours(&seed_key, topn + 50);
        let mut results = Vec::with_capacity(topn);
        for (key, score) in neighbours {
            if results.len() >= topn {
                break;
            }
            let Ok(cand_id) = key.parse::<i64>() else {
                continue;
            };
            if cand_id == seed_id {
                continue;
            }
            let Some(track) = self.catalogue.lookup(cand_id) else {
                continue;
            };
            let main_genre = first_genre_token(&track.primary_genre);
            results.push(Candidate::new(
                cand_id,
                score,
                track.name.clone(),
                track.display_artist.clone(),
                track.artist_key.clone(),
                main_genre,
            ));
        }
        results
    }

    fn get_cf_candidates_with_rerank(
        &self,
        seed_id: i64,
        seed_primary_genre: &str,
        topk_final: usize,
    ) -> Vec<Candidate> {
        let raw = self.get_cf_candidates_raw(seed_id, self.params.candidate_topn);
        if raw.is_empty() {
            return Vec::new();
        }
        apply_reranking(raw, seed_primary_genre, &self.params.rerank, topk_final)
    }

    fn compute_audio_scores(&self, seed_id: i64, candidate_ids: &[i64]) -> HashMap<i64, f64> {
        let Some(audio) = &self.audio else {
            return HashMap::new();
        };
        let Some(seed_vec) = audio.vector(seed_id) else {
            return HashMap::new();
        };
        let (found_ids, matrix) = audio.gather(candidate_ids);
        if found_ids.is_empty() {
            return HashMap::new();
        }
        let sims = batch_cosine_similarity(seed_vec, matrix.view());
        found_ids
            .into_iter()
            .zip(sims.iter().copied())
            .map(|(id, s)| (id, s as f64))
            .collect()
    }

    fn fuse_hybrid_scores(&self, candidates: &[Candidate], audio_scores: &HashMap<i64, f64>) -> Vec<(i64, f64)> {
        let alpha_cf = 1.0 - self.params.alpha_audio;
        let beta_audio = self.params.alpha_audio;

        let cf_values: Vec<f32> = candidates.iter().map(|c| c.score_final as f32).collect();
        let audio_values: Vec<f32> = candidates
            .iter()
            .map(|c| audio_scores.get(&c.id).map(|&s| s as f32).unwrap_or(f32::NAN))
            .collect();

        let cf_norm = minmax_normalize(&cf_values);
        let audio_norm = minmax_normalize(&audio_values);

        let mut scored: Vec<(i64, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let hybrid = alpha_cf * cf_norm[i] as f64 + beta_audio * audio_norm[i] as f64;
                (c.id, hybrid)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored
    }
}

fn first_genre_token(genre: &str) -> String {
    genre.split(", ").next().unwrap_or("").to_string()
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

//! Re-ranking pipeline (stage 1.5): takes raw collaborative-filtering
//! candidates and applies artist diversity and genre-railguard penalties
//! before the final hardcut selection.
//!
//! All three stages operate on a single `Candidate` struct carrying every
//! intermediate score, rather than parallel arrays, so a candidate's whole
//! history through the pipeline stays in one place.

use std::collections::HashMap;

use crate::scoring::{genre_group, is_special_group};

/// Penalty weights and limits the re-ranking stages are parameterized by.
#[derive(Debug, Clone, Copy)]
pub struct RerankParams {
    pub max_per_artist_soft: usize,
    pub max_per_artist_final: usize,
    pub penalty_per_extra: f64,
    pub offrail_penalty_general: f64,
    pub offrail_penalty_special: f64,
}

/// A single CF candidate and every score it accumulates through the
/// pipeline.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub score_cf: f64,
    pub song_name: String,
    pub display_artist: String,
    pub artist_key: String,
    pub primary_genre: String,
    pub artist_penalty_soft: f64,
    pub score_after_artist: f64,
    pub genre_penalty: f64,
    pub score_after_genre: f64,
    pub score_final: f64,
}

impl Candidate {
    pub fn new(
        id: i64,
        score_cf: f64,
        song_name: String,
        display_artist: String,
        artist_key: String,
        primary_genre: String,
    ) -> Self {
        Self {
            id,
            score_cf,
            song_name,
            display_artist,
            artist_key,
            primary_genre,
            artist_penalty_soft: 0.0,
            score_after_artist: score_cf,
            genre_penalty: 0.0,
            score_after_genre: score_cf,
            score_final: score_cf,
        }
    }
}

fn stable_sort_desc_by(candidates: &mut [Candidate], key: impl Fn(&Candidate) -> f64) {
    candidates.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Stage A: penalize tracks from artists that already appear often among
/// higher-scoring candidates, so one prolific artist can't dominate the
/// list.
fn apply_artist_soft_penalty(mut candidates: Vec<Candidate>, params: &RerankParams) -> Vec<Candidate> {
    stable_sort_desc_by(&mut candidates, |c| c.score_cf);

    let mut seen: HashMap<String, usize> = HashMap::new();
    for candidate in &mut candidates {
        let ord = *seen.get(&candidate.artist_key).unwrap_or(&0);
        seen.insert(candidate.artist_key.clone(), ord + 1);

        candidate.artist_penalty_soft = if ord < params.max_per_artist_soft {
            0.0
        } else {
            (ord - params.max_per_artist_soft + 1) as f64 * params.penalty_per_extra
        };
        candidate.score_after_artist = candidate.score_cf - candidate.artist_penalty_soft;
    }
    candidates
}

/// Stage B: penalize candidates whose genre drifts away from the seed's,
/// with a steeper penalty when crossing between "special" genre families
/// (trot, CCM, kids, gugak) that listeners rarely mix.
fn apply_genre_railguard(mut candidates: Vec<Candidate>, seed_primary_genre: &str, params: &RerankParams) -> Vec<Candidate> {
    let seed_group = genre_group(seed_primary_genre);

    for candidate in &mut candidates {
        let cand_group = genre_group(&candidate.primary_genre);

        candidate.genre_penalty = if seed_group == "UNK" {
            0.0
        } else if cand_group == seed_group {
            0.0
        } else {
            let seed_special = is_special_group(seed_group);
            let cand_special = is_special_group(cand_group);
            if seed_special && cand_special {
                params.offrail_penalty_special
            } else if seed_special || cand_special {
                params.offrail_penalty_general * 1.5
            } else {
                params.offrail_penalty_general
            }
        };
        candidate.score_after_genre = candidate.score_after_artist - candidate.genre_penalty;
    }
    candidates
}

/// Stage C: greedily select the highest-scoring candidates subject to a
/// hard per-artist cap, so the final list never crowds out one artist even
/// after the soft penalty.
fn apply_artist_hardcut(mut candidates: Vec<Candidate>, params: &RerankParams, topk_final: usize) -> Vec<Candidate> {
    stable_sort_desc_by(&mut candidates, |c| c.score_after_genre);

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut selected = Vec::with_capacity(topk_final);

    for mut candidate in candidates {
        if selected.len() >= topk_final {
            break;
        }
        let count = counts.entry(candidate.artist_key.clone()).or_insert(0);
        if *count >= params.max_per_artist_final {
            continue;
        }
        *count += 1;
        candidate.score_final = candidate.score_after_genre;
        selected.push(candidate);
    }
    selected
}

/// Run all three re-ranking stages in sequence.
pub fn apply_reranking(
    candidates: Vec<Candidate>,
    seed_primary_genre: &str,
    params: &RerankParams,
    topk_final: usize,
) -> Vec<Candidate> {
    let candidates = apply_artist_soft_penalty(candidates, params);
    let candidates = apply_genre_railguard(candidates, seed_primary_genre, params);
    apply_artist_hardcut(candidates, params, topk_final)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RerankParams {
        RerankParams {
            max_per_artist_soft: 3,
            max_per_artist_final: 2,
            penalty_per_extra: 0.05,
            offrail_penalty_general: 0.008,
            offrail_penalty_special: 0.03,
        }
    }

    #[test]
    fn artist_soft_penalty_applies_after_the_free_quota() {
        let candidates = vec![
            Candidate::new(1, 1.0, "T1".into(), "".into(), "A".into(), "GN1500".into()),
            Candidate::new(2, 0.9, "T2".into(), "".into(), "A".into(), "GN1500".into()),
            Candidate::new(3, 0.7, "T3".into(), "".into(), "A".into(), "GN1500".into()),
            Candidate::new(4, 0.5, "T4".into(), "".into(), "A".into(), "GN1500".into()),
        ];
        let params = RerankParams {
            max_per_artist_soft: 3,
            ..params()
        };
        let result = apply_artist_soft_penalty(candidates, &params);
        assert_eq!(result[0].artist_penalty_soft, 0.0);
        assert_eq!(result[1].artist_penalty_soft, 0.0);
        assert_eq!(result[2].artist_penalty_soft, 0.0);
        assert!((result[3].artist_penalty_soft - 0.05).abs() < 1e-9);
    }

    #[test]
    fn genre_railguard_skips_same_group_and_unknown_seed() {
        let mut candidates = vec![
            Candidate::new(1, 1.0, "T1".into(), "".into(), "A".into(), "GN1500".into()),
            Candidate::new(2, 1.0, "T2".into(), "".into(), "B".into(), "GN0700".into()),
        ];
        candidates[0].score_after_artist = 1.0;
        candidates[1].score_after_artist = 1.0;

        let result = apply_genre_railguard(candidates, "GN1500", &params());
        assert_eq!(result[0].genre_penalty, 0.0);
        assert!(result[1].genre_penalty > 0.0);
    }

    #[test]
    fn artist_hardcut_enforces_per_artist_cap() {
        let mut candidates = vec![
            Candidate::new(1, 1.0, "T1".into(), "".into(), "A".into(), "".into()),
            Candidate::new(2, 0.9, "T2".into(), "".into(), "A".into(), "".into()),
            Candidate::new(3, 0.8, "T3".into(), "".into(), "A".into(), "".into()),
            Candidate::new(4, 0.7, "T4".into(), "".into(), "B".into(), "".into()),
        ];
        for c in &mut candidates {
            c.score_after_genre = c.score_cf;
        }
        let result = apply_artist_hardcut(candidates, &params(), 10);
        let artist_a_count = result.iter().filter(|c| c.artist_key == "A").count();
        assert_eq!(artist_a_count, 2);
        assert_eq!(result.len(), 3);
    }
}

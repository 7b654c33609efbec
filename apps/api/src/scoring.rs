//! Scoring kernel: cosine similarity, min-max normalization, and genre
//! grouping. These are the small numeric primitives the re-ranking pipeline
//! and the recommendation engine build on.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

const NORM_EPSILON: f32 = 1e-8;

/// Special genre groups that face a steeper off-rail penalty when crossed.
pub const SPECIAL_GENRE_GROUPS: [&str; 4] = ["TROT", "CCM", "KIDS", "GUGAK"];

/// Cosine similarity between `query` and every row of `candidates`, computed
/// as a single matrix-vector product rather than a per-row loop.
pub fn batch_cosine_similarity(query: ArrayView1<f32>, candidates: ArrayView2<f32>) -> Array1<f32> {
    let query_norm = query.dot(&query).sqrt();
    let dots = candidates.dot(&query);
    let candidate_norms: Array1<f32> = candidates
        .rows()
        .into_iter()
        .map(|row| row.dot(&row).sqrt())
        .collect();

    dots / (candidate_norms * query_norm + NORM_EPSILON)
}

/// Min-max normalize `values` to `[0, 1]`.
///
/// NaN entries are treated as missing: they never influence the min/max and
/// always come out as `0.0`. If every value is NaN, the result is all
/// zeros. If the valid values are all equal (or nearly so), every valid
/// entry normalizes to `0.5`.
pub fn minmax_normalize(values: &[f32]) -> Vec<f32> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut any_valid = false;

    for &v in values {
        if v.is_nan() {
            continue;
        }
        any_valid = true;
        min = min.min(v);
        max = max.max(v);
    }

    if !any_valid {
        return vec![0.0; values.len()];
    }

    let range = max - min;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                0.0
            } else if range < NORM_EPSILON {
                0.5
            } else {
                (v - min) / range
            }
        })
        .collect()
}

/// Map a raw genre code to its broad classification group.
///
/// Empty or non-genre input classifies as `UNK`; anything else falls back
/// to its first four characters, which is how the underlying genre
/// taxonomy encodes broad families (e.g. `GN15` for ballad).
pub fn genre_group(code: &str) -> &str {
    if code.is_empty() {
        return "UNK";
    }
    match &code[..code.len().min(4)] {
        "GN07" | "GN11" => "TROT",
        "GN19" => "CCM",
        "GN22" => "KIDS",
        "GN24" => "GUGAK",
        other => other,
    }
}

pub fn is_special_group(group: &str) -> bool {
    SPECIAL_GENRE_GROUPS.contains(&group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn cosine_similarity_matches_known_vectors() {
        let query: Array1<f32> = array![1.0, 0.0];
        let candidates: Array2<f32> = array![[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];
        let sims = batch_cosine_similarity(query.view(), candidates.view());
        assert!((sims[0] - 1.0).abs() < 1e-4);
        assert!(sims[1].abs() < 1e-4);
        assert!((sims[2] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn minmax_normalize_hits_zero_and_one_at_extremes() {
        let values = vec![5.0, 1.0, 3.0];
        let normalized = minmax_normalize(&values);
        assert_eq!(normalized[1], 0.0);
        assert_eq!(normalized[0], 1.0);
    }

    #[test]
    fn minmax_normalize_handles_nan_and_constant_input() {
        let values = vec![f32::NAN, f32::NAN];
        assert_eq!(minmax_normalize(&values), vec![0.0, 0.0]);

        let values = vec![2.0, 2.0, f32::NAN];
        let normalized = minmax_normalize(&values);
        assert_eq!(normalized[0], 0.5);
        assert_eq!(normalized[1], 0.5);
        assert_eq!(normalized[2], 0.0);
    }

    #[test]
    fn genre_group_classifies_known_families() {
        assert_eq!(genre_group("GN0701"), "TROT");
        assert_eq!(genre_group("GN1105"), "TROT");
        assert_eq!(genre_group("GN1900"), "CCM");
        assert_eq!(genre_group("GN2200"), "KIDS");
        assert_eq!(genre_group("GN2400"), "GUGAK");
        assert_eq!(genre_group(""), "UNK");
        assert_eq!(genre_group("GN1500"), "GN15");
    }

    #[test]
    fn genre_group_is_idempotent() {
        for code in ["GN0701", "GN1900", "GN2200", "GN2400", "", "GN1500"] {
            let first = genre_group(code);
            let second = genre_group(code);
            assert_eq!(first, second);
        }
    }
}

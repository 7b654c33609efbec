//! Co-listening vocabulary: nearest-neighbour lookups over a pre-trained
//! item embedding space.
//!
//! The vocabulary is distributed as a line-oriented text file rather than a
//! binary model format, so it can be loaded without pulling in a machine
//! learning runtime:
//!
//! ```text
//! <seed_key> <neighbour_key>:<score> <neighbour_key>:<score> ...
//! ```
//!
//! Keys are opaque strings (track ids, in practice) and scores are the
//! trained model's pairwise similarity.

use std::collections::{HashMap, HashSet};
use std::fs;

use anyhow::{Context, Result};

/// A loaded co-listening vocabulary, or `None` if no vocabulary was
/// configured for this deployment.
pub struct CoListeningVocabulary {
    neighbours: HashMap<String, Vec<(String, f64)>>,
    vocab_keys: HashSet<String>,
}

impl CoListeningVocabulary {
    /// Load the vocabulary from `path`. Returns `Ok(None)` if `path` is
    /// empty or the file does not exist: the collaborative-filtering
    /// resource is optional, unlike the catalogue.
    pub fn load(path: &str) -> Result<Option<Self>> {
        if path.is_empty() {
            return Ok(None);
        }
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::warn!(path, "co-listening vocabulary file not found, skipping");
                return Ok(None);
            }
        };

        let mut neighbours = HashMap::new();
        let mut vocab_keys = HashSet::new();

        for (line_no, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let seed_key = parts
                .next()
                .with_context(|| format!("vocabulary line {} is empty", line_no + 1))?
                .to_string();

            let mut pairs = Vec::new();
            for token in parts {
                let (key, score) = token
                    .rsplit_once(':')
                    .with_context(|| format!("vocabulary line {}: malformed pair '{}'", line_no + 1, token))?;
                let score: f64 = score
                    .parse()
                    .with_context(|| format!("vocabulary line {}: invalid score '{}'", line_no + 1, score))?;
                vocab_keys.insert(key.to_string());
                pairs.push((key.to_string(), score));
            }
            pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            vocab_keys.insert(seed_key.clone());
            neighbours.insert(seed_key, pairs);
        }

        Ok(Some(Self { neighbours, vocab_keys }))
    }

    /// Whether `key` appears anywhere in the trained vocabulary, as a seed
    /// or as a neighbour.
    pub fn contains_key(&self, key: &str) -> bool {
        self.vocab_keys.contains(key)
    }

    /// Up to `n` nearest neighbours of `key`, sorted by descending score.
    /// Returns an empty vector if `key` has no recorded neighbours.
    pub fn neighbours(&self, key: &str, n: usize) -> Vec<(String, f64)> {
        match self.neighbours.get(key) {
            Some(pairs) => pairs.iter().take(n).cloned().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn returns_none_for_empty_path() {
        assert!(CoListeningVocabulary::load("").unwrap().is_none());
    }

    #[test]
    fn returns_none_for_missing_file() {
        assert!(CoListeningVocabulary::load("/nonexistent/path.txt").unwrap().is_none());
    }

    #[test]
    fn parses_and_sorts_neighbours_by_score_descending() {
        let file = write_temp("1 2:0.5 3:0.9 4:0.1\n");
        let vocab = CoListeningVocabulary::load(file.path().to_str().unwrap())
            .unwrap()
            .unwrap();

        assert!(vocab.contains_key("1"));
        assert!(vocab.contains_key("3"));
        assert!(!vocab.contains_key("999"));

        let top = vocab.neighbours("1", 2);
        assert_eq!(top, vec![("3".to_string(), 0.9), ("2".to_string(), 0.5)]);
    }

    #[test]
    fn unknown_key_has_no_neighbours() {
        let file = write_temp("1 2:0.5\n");
        let vocab = CoListeningVocabulary::load(file.path().to_str().unwrap())
            .unwrap()
            .unwrap();
        assert!(vocab.neighbours("42", 5).is_empty());
    }
}

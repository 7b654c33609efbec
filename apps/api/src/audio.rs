//! Audio content embeddings: a fixed-size vector per track, used for the
//! audio-similarity half of hybrid fusion.
//!
//! Embeddings are distributed as a compressed NumPy archive (`.npz`) with
//! one array of track ids and one 2-D array of embeddings. Real-world
//! exports use inconsistent array names, so key discovery is tolerant.

use std::collections::HashMap;
use std::fs::File;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use ndarray_npy::NpzReader;

const ID_KEYS: [&str; 3] = ["song_ids", "ids", "song_id"];
const EMBEDDING_KEYS: [&str; 4] = ["embeddings", "emb", "audio_embeddings", "embedding"];

/// Loaded audio embeddings with an id -> row index map for O(1) lookup.
pub struct AudioEmbeddingBundle {
    embeddings: Array2<f32>,
    song_id_to_idx: HashMap<i64, usize>,
    model_type: String,
}

impl AudioEmbeddingBundle {
    /// Load the bundle from `path`. Returns `Ok(None)` if `path` is empty,
    /// the file is missing, or the archive doesn't carry a usable shape:
    /// audio scoring degrades gracefully to CF-only recommendations.
    pub fn load(path: &str, model_type: &str) -> Result<Option<Self>> {
        if path.is_empty() {
            return Ok(None);
        }
        match Self::try_load(path, model_type) {
            Ok(bundle) => Ok(Some(bundle)),
            Err(err) => {
                tracing::warn!(path, error = %err, "audio embedding archive unusable, skipping");
                Ok(None)
            }
        }
    }

    fn try_load(path: &str, model_type: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening audio archive '{}'", path))?;
        let mut npz = NpzReader::new(file).context("reading npz archive")?;
        let names = npz.names().context("listing npz archive entries")?;

        match (find_key(&names, &ID_KEYS), find_key(&names, &EMBEDDING_KEYS)) {
            (Some(ids_name), Some(embeddings_name)) => {
                let song_ids: Array1<i64> = npz.by_name(&ids_name).context("reading id array")?;
                let embeddings: Array2<f32> = npz.by_name(&embeddings_name).context("reading embedding array")?;

                if song_ids.len() != embeddings.nrows() {
                    anyhow::bail!(
                        "id count ({}) does not match embedding row count ({})",
                        song_ids.len(),
                        embeddings.nrows()
                    );
                }

                let song_id_to_idx = song_ids
                    .iter()
                    .enumerate()
                    .map(|(idx, &id)| (id, idx))
                    .collect();

                Ok(Self {
                    embeddings,
                    song_id_to_idx,
                    model_type: model_type.to_string(),
                })
            }
            _ => Self::try_load_dict_of_vectors(&mut npz, &names, model_type),
        }
    }

    /// Fallback for archives with no recognized id/embedding array names:
    /// treats every entry whose (stem) name parses as a decimal id as one
    /// track's embedding vector.
    fn try_load_dict_of_vectors(npz: &mut NpzReader<File>, names: &[String], model_type: &str) -> Result<Self> {
        let mut entries: Vec<(i64, Array1<f32>)> = Vec::new();
        for name in names {
            let stem = name.strip_suffix(".npy").unwrap_or(name);
            if let Ok(id) = stem.parse::<i64>() {
                let vector: Array1<f32> = npz
                    .by_name(name)
                    .with_context(|| format!("reading vector for id {}", id))?;
                entries.push((id, vector));
            }
        }

        if entries.is_empty() {
            anyhow::bail!("no id/embedding arrays and no decimal-id-keyed vectors found in archive");
        }

        let dim = entries[0].1.len();
        let mut embeddings = Array2::<f32>::zeros((entries.len(), dim));
        let mut song_id_to_idx = HashMap::with_capacity(entries.len());
        for (idx, (id, vector)) in entries.into_iter().enumerate() {
            if vector.len() != dim {
                anyhow::bail!("inconsistent embedding dimension for id {}", id);
            }
            embeddings.row_mut(idx).assign(&vector);
            song_id_to_idx.insert(id, idx);
        }

        Ok(Self {
            embeddings,
            song_id_to_idx,
            model_type: model_type.to_string(),
        })
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn contains(&self, id: i64) -> bool {
        self.song_id_to_idx.contains_key(&id)
    }

    pub fn vector(&self, id: i64) -> Option<ndarray::ArrayView1<'_, f32>> {
        let idx = *self.song_id_to_idx.get(&id)?;
        Some(self.embeddings.row(idx))
    }

    /// Gather the embeddings for `ids` that are present in the bundle,
    /// preserving order and skipping ids that aren't found.
    pub fn gather(&self, ids: &[i64]) -> (Vec<i64>, Array2<f32>) {
        let rows: Vec<(i64, usize)> = ids
            .iter()
            .filter_map(|&id| self.song_id_to_idx.get(&id).map(|&idx| (id, idx)))
            .collect();

        let dim = self.embeddings.ncols();
        let mut matrix = Array2::<f32>::zeros((rows.len(), dim));
        let mut found_ids = Vec::with_capacity(rows.len());
        for (row_idx, (id, src_idx)) in rows.into_iter().enumerate() {
            matrix.row_mut(row_idx).assign(&self.embeddings.row(src_idx));
            found_ids.push(id);
        }
        (found_ids, matrix)
    }
}

fn find_key(names: &[String], candidates: &[&str]) -> Option<String> {
    for candidate in candidates {
        for name in names {
            let stem = name.strip_suffix(".npy").unwrap_or(name);
            if stem == *candidate {
                return Some(name.clone());
            }
        }
    }
    None
}

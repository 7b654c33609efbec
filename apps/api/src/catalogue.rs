//! Track catalogue: the authoritative id -> metadata registry
//!
//! Loads track metadata from a JSON array with tolerant, multi-key field
//! extraction (the source dataset is inconsistent about field names across
//! exports) and serves O(1) lookups plus a linear substring search.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

const DEMO_RECORD_COUNT: i64 = 5000;
const DEMO_GENRE_CODES: [&str; 5] = ["GN0700", "GN1100", "GN1900", "GN2200", "GN2400"];
const DEMO_ARTIST_COUNT: i64 = 100;

/// A single track's metadata as served by the catalogue
#[derive(Debug, Clone)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub display_artist: String,
    pub artist_key: String,
    pub primary_genre: String,
    pub year: Option<i32>,
}

/// In-memory registry of all tracks, built once at startup
pub struct CatalogueRegistry {
    by_id: HashMap<i64, Track>,
    ids: Vec<i64>,
    search_index: Vec<(i64, String)>,
}

impl CatalogueRegistry {
    /// Load the catalogue from `path`.
    ///
    /// If `path` is empty or the file is missing, returns a synthetic
    /// catalogue when `demo_mode` is set, and a hard error otherwise: the
    /// catalogue is the one resource the service cannot run without.
    pub fn load(path: &str, demo_mode: bool) -> Result<Self> {
        let raw = if path.is_empty() {
            None
        } else {
            fs::read_to_string(path).ok()
        };

        let records = match raw {
            Some(raw) => parse_records(&raw)?,
            None => {
                if demo_mode {
                    tracing::warn!(path, "song metadata file not found, generating demo catalogue");
                    return Ok(Self::demo());
                }
                anyhow::bail!("song metadata file not found at '{}' and demo mode disabled", path);
            }
        };

        if records.is_empty() {
            if demo_mode {
                tracing::warn!("song metadata file was empty, generating demo catalogue");
                return Ok(Self::demo());
            }
            anyhow::bail!("song metadata file '{}' contained no records", path);
        }

        Ok(Self::from_tracks(records))
    }

    /// Build a deterministic synthetic catalogue for demo mode.
    fn demo() -> Self {
        let tracks = (1..=DEMO_RECORD_COUNT)
            .map(|id| {
                let genre = DEMO_GENRE_CODES[(id % DEMO_GENRE_CODES.len() as i64) as usize];
                let artist_idx = id % DEMO_ARTIST_COUNT;
                Track {
                    id,
                    name: format!("Demo Track {id}"),
                    display_artist: format!("Demo Artist {artist_idx}"),
                    artist_key: artist_idx.to_string(),
                    primary_genre: genre.to_string(),
                    year: Some(2000 + (id % 24) as i32),
                }
            })
            .collect();
        Self::from_tracks(tracks)
    }

    fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut by_id = HashMap::with_capacity(tracks.len());
        let mut ids = Vec::with_capacity(tracks.len());
        let mut search_index = Vec::with_capacity(tracks.len());

        for track in tracks {
            if by_id.contains_key(&track.id) {
                tracing::debug!(id = track.id, "duplicate track id in catalogue, keeping first");
                continue;
            }
            let text = normalize_text(&format!("{} {}", track.name, track.display_artist));
            ids.push(track.id);
            search_index.push((track.id, text));
            by_id.insert(track.id, track);
        }

        Self { by_id, ids, search_index }
    }

    /// Number of tracks in the catalogue
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// O(1) metadata lookup by id
    pub fn lookup(&self, id: i64) -> Option<&Track> {
        self.by_id.get(&id)
    }

    /// All track ids in insertion order
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    #[cfg(test)]
    pub(crate) fn load_from_json_for_test(raw: &str) -> Self {
        Self::from_tracks(parse_records(raw).unwrap())
    }

    /// Linear substring search over the normalized (name, artist) text,
    /// stopping once `limit` matches are collected.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Track> {
        let needle = normalize_text(query);
        let mut results = Vec::with_capacity(limit.min(16));
        for (id, text) in &self.search_index {
            if text.contains(&needle) {
                if let Some(track) = self.by_id.get(id) {
                    results.push(track);
                }
                if results.len() >= limit {
                    break;
                }
            }
        }
        results
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase().trim().to_string()
}

fn parse_records(raw: &str) -> Result<Vec<Track>> {
    let value: Value = serde_json::from_str(raw).context("song metadata file is not valid JSON")?;

    let records: Vec<&Value> = match &value {
        Value::Array(array) => array.iter().collect(),
        Value::Object(map) => {
            if map.values().all(|v| v.is_object()) {
                map.values().collect()
            } else {
                vec![&value]
            }
        }
        _ => anyhow::bail!("song metadata file must contain a JSON array or object of records"),
    };

    Ok(records.into_iter().filter_map(extract_track).collect())
}

fn extract_track(item: &Value) -> Option<Track> {
    let id = extract_id(item, &["id", "song_id", "sid"])?;
    let name = extract_string(item, &["song_name", "title", "name", "track_name"])
        .unwrap_or_else(|| "Unknown".to_string());
    let display_artist = extract_artist(item);
    let primary_genre = extract_genre(item);
    let year = extract_year(item);
    let artist_key = extract_artist_key(item);

    Some(Track {
        id,
        name,
        display_artist,
        artist_key,
        primary_genre,
        year,
    })
}

fn extract_id(item: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(value) = item.get(key) {
            if let Some(n) = value.as_i64() {
                return Some(n);
            }
            if let Some(s) = value.as_str() {
                if let Ok(n) = s.parse::<i64>() {
                    return Some(n);
                }
            }
        }
    }
    None
}

fn extract_string(item: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = item.get(key) {
            if let Some(s) = value.as_str() {
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            }
        }
    }
    None
}

fn join_array(value: &Value) -> Option<String> {
    let array = value.as_array()?;
    let joined = array
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string())))
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn extract_artist(item: &Value) -> String {
    if let Some(value) = item.get("artist_name_basket") {
        if let Some(joined) = join_array(value) {
            return joined;
        }
    }
    extract_string(item, &["artist", "artist_name", "artists"]).unwrap_or_default()
}

fn extract_genre(item: &Value) -> String {
    for key in ["song_gn_gnr_basket", "song_gn_dtl_gnr_basket"] {
        if let Some(value) = item.get(key) {
            if let Some(joined) = join_array(value) {
                return joined;
            }
        }
    }
    extract_string(item, &["genre", "genres"]).unwrap_or_default()
}

fn extract_year(item: &Value) -> Option<i32> {
    for key in ["issue_date", "issue_year"] {
        if let Some(value) = item.get(key) {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if text.len() >= 4 {
                if let Ok(year) = text[..4].parse::<i32>() {
                    return Some(year);
                }
            }
        }
    }
    None
}

fn extract_artist_key(item: &Value) -> String {
    if let Some(value) = item.get("artist_id_basket") {
        if let Some(array) = value.as_array() {
            if let Some(first) = array.first() {
                if let Some(s) = first.as_str() {
                    return s.to_string();
                }
                if let Some(n) = first.as_i64() {
                    return n.to_string();
                }
            }
        }
    }
    "UNKNOWN".to_string()
}

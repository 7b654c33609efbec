//! HTTP route handlers for the VibeCurator API
//!
//! This module contains the three REST endpoints the service exposes:
//! health, track lookup/search, and the recommendation pipeline itself.

pub mod health;
pub mod recommend;
pub mod songs;

use std::sync::Arc;

use crate::cache::RecommendCache;
use crate::catalogue::CatalogueRegistry;
use crate::config::Config;
use crate::engine::RecommendationEngine;

/// Shared application state handed to every route handler.
///
/// Resources that failed to load (or were never configured) are `None`
/// rather than absent fields, so a handler can report exactly which piece
/// is missing instead of the whole state being unavailable.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalogue: Option<Arc<CatalogueRegistry>>,
    pub audio_meta: Option<Arc<CatalogueRegistry>>,
    pub vocabulary_loaded: bool,
    pub audio_loaded: bool,
    pub audio_model_type: Option<String>,
    pub engine: Option<Arc<RecommendationEngine>>,
    pub cache: Arc<RecommendCache>,
}

/// Scopes an environment variable override to a test, restoring the prior
/// value (or unsetting it) on drop.
#[cfg(test)]
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

#[cfg(test)]
impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self { key, original }
    }
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.original {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

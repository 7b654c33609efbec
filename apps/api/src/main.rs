use axum::{http::Method, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod audio;
mod cache;
mod catalogue;
mod config;
mod engine;
mod error;
mod models;
mod rerank;
mod routes;
mod scoring;
mod vocabulary;

pub use error::{ApiError, ApiResult, ErrorResponse};

use audio::AudioEmbeddingBundle;
use cache::RecommendCache;
use catalogue::CatalogueRegistry;
use engine::RecommendationEngine;
use routes::{health::health_router, recommend::recommend_router, songs::songs_router, AppState};
use vocabulary::CoListeningVocabulary;

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ALLOWED_ORIGINS` is set, only those origins are allowed
/// - If it is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ALLOWED_ORIGINS` is set, those origins are used
/// - If it is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &config::Config) -> CorsLayer {
    let is_production = config.is_production();

    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!("CORS configured with {} allowed origin(s)", allowed_origins.len());
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::OPTIONS])
            }
        }
        _ if is_production => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not configured in production mode. \
                 CORS requests will be rejected."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!("Using permissive CORS in development mode.");
            CorsLayer::permissive()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibecurator_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;
    let engine_cfg = config.engine().clone();

    tracing::info!("Starting VibeCurator API server on port {}", config.port);

    let catalogue = match CatalogueRegistry::load(&engine_cfg.song_meta_path, engine_cfg.demo_mode) {
        Ok(registry) => {
            tracing::info!(count = registry.len(), "catalogue loaded");
            Some(Arc::new(registry))
        }
        Err(err) => {
            tracing::error!(error = %err, "catalogue failed to load, engine will be disabled");
            None
        }
    };

    let audio_meta = match CatalogueRegistry::load(&engine_cfg.song_meta_audio_path, false) {
        Ok(registry) => Some(Arc::new(registry)),
        Err(_) => None,
    };

    let vocabulary = CoListeningVocabulary::load(&engine_cfg.item2vec_path)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "co-listening vocabulary failed to load");
            None
        })
        .map(Arc::new);

    let audio_bundle = AudioEmbeddingBundle::load(engine_cfg.active_audio_emb_path(), &engine_cfg.audio_model)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "audio embedding bundle failed to load");
            None
        })
        .map(Arc::new);

    let cache = Arc::new(RecommendCache::connect(&config.redis().connection_url()));

    let engine = catalogue.as_ref().map(|catalogue| {
        Arc::new(RecommendationEngine::new(
            catalogue.clone(),
            vocabulary.clone(),
            audio_bundle.clone(),
            &engine_cfg,
        ))
    });
    if engine.is_none() {
        tracing::warn!("catalogue unavailable, recommendation engine disabled");
    }

    let state = AppState {
        config: Arc::new(config.clone()),
        catalogue,
        audio_meta,
        vocabulary_loaded: vocabulary.is_some(),
        audio_loaded: audio_bundle.is_some(),
        audio_model_type: audio_bundle.as_ref().map(|b| b.model_type().to_string()),
        engine,
        cache,
    };

    let cors_layer = build_cors_layer(&config);

    let app = Router::new()
        .route("/", axum::routing::get(root))
        .nest("/health", health_router(state.clone()))
        .merge(songs_router(state.clone()))
        .merge(recommend_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "VibeCurator recommendation API"
}

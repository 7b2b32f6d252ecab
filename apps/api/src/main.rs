mod analysis;
mod config;
mod errors;
mod routes;
mod state;
mod taxonomy;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::PipelineAnalyzer;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::{defaults::default_taxonomy, Taxonomy};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume match API v{}", env!("CARGO_PKG_VERSION"));

    let taxonomy = Arc::new(load_taxonomy(&config)?);
    info!(
        categories = taxonomy.categories().len(),
        roles = taxonomy.roles().len(),
        "Skill taxonomy loaded"
    );

    let analyzer = PipelineAnalyzer::new(taxonomy.clone(), config.analyzer_settings());
    info!(
        similarity_weight = config.similarity_weight,
        max_upload_bytes = config.max_upload_bytes,
        timeout_secs = config.request_timeout.as_secs(),
        "Analyzer initialized"
    );

    let cors = cors_layer(&config)?;

    let state = AppState {
        config: config.clone(),
        taxonomy,
        analyzer: Arc::new(analyzer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_taxonomy(config: &Config) -> Result<Taxonomy> {
    match &config.taxonomy_path {
        Some(path) => Taxonomy::load(path)
            .with_context(|| format!("Failed to load taxonomy from {}", path.display())),
        None => default_taxonomy().context("Built-in taxonomy is invalid"),
    }
}

fn cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.cors_allowed_origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS not set; allowing any origin");
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::permissive().allow_origin(AllowOrigin::list(origins)))
}

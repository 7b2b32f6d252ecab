pub mod health;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::analysis::handlers;
use crate::state::AppState;
use crate::taxonomy::Taxonomy;

/// GET /api/taxonomy
async fn taxonomy_handler(State(state): State<AppState>) -> Json<Taxonomy> {
    Json(state.taxonomy.as_ref().clone())
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = handlers::form_body_limit(state.config.max_upload_bytes);

    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/taxonomy", get(taxonomy_handler))
        .route("/api/analyze", post(handlers::handle_analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

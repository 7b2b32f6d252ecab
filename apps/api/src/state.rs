use std::sync::Arc;

use crate::analysis::MatchAnalyzer;
use crate::config::Config;
use crate::taxonomy::Taxonomy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at start-up; the analyzer holds its own handle to the same taxonomy.
    pub taxonomy: Arc<Taxonomy>,
    /// Pluggable analyzer. Default: PipelineAnalyzer.
    pub analyzer: Arc<dyn MatchAnalyzer>,
}

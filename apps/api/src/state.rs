use std::sync::Arc;

use crate::analysis_client::SuggestionSource;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable suggestion source. Default: `AnalysisClient` over HTTP.
    pub suggestions: Arc<dyn SuggestionSource>,
}

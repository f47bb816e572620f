pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::suggestions::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/suggestions", post(handlers::handle_suggest))
        .route(
            "/api/v1/suggestions/segment",
            post(handlers::handle_segment),
        )
        .with_state(state)
}

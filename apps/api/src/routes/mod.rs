pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as evaluation;
use crate::history::handlers as history;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/debug", get(health::debug_handler))
        // Evaluation API
        .route("/api/v1/evaluations", post(evaluation::handle_evaluate))
        .route(
            "/api/v1/evaluations/compare",
            post(evaluation::handle_compare),
        )
        // History API
        .route(
            "/api/v1/history",
            get(history::handle_get_history).delete(history::handle_reset_history),
        )
        .route(
            "/api/v1/history/export",
            get(history::handle_export_history),
        )
        .route("/api/v1/history/save", post(history::handle_save_history))
        .route("/api/v1/history/load", post(history::handle_load_history))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "smartresume-api"
    }))
}

/// GET /api/v1/debug
/// Credential status, model and the current session history.
pub async fn debug_handler(State(state): State<AppState>) -> Json<Value> {
    let history = state.history.lock().await;
    Json(json!({
        "api_key": if state.config.api_key_set() { "Set" } else { "Not set" },
        "model": state.llm.as_ref().map(|llm| llm.model().to_string()),
        "history_path": state.config.history_path.display().to_string(),
        "history_len": history.len(),
        "history": history.entries(),
    }))
}

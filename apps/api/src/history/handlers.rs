//! Axum route handlers for the History API.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::history::HistoryEntry;
use crate::state::AppState;

const EXPORT_FILENAME: &str = "evaluation_history.txt";

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: usize,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub loaded: usize,
    pub entries: Vec<HistoryEntry>,
    pub message: String,
}

/// GET /api/v1/history
pub async fn handle_get_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    let history = state.history.lock().await;
    Json(HistoryResponse {
        count: history.len(),
        entries: history.entries().to_vec(),
    })
}

/// DELETE /api/v1/history
/// Starts a fresh session history. Saved files are not touched.
pub async fn handle_reset_history(State(state): State<AppState>) -> StatusCode {
    state.history.lock().await.reset();
    tracing::info!("History reset");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/history/export
pub async fn handle_export_history(State(state): State<AppState>) -> impl IntoResponse {
    let text = state.history.lock().await.export_text();
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        text,
    )
}

/// POST /api/v1/history/save
/// The store lock is held until the file is written, so saves and loads never interleave.
pub async fn handle_save_history(
    State(state): State<AppState>,
) -> Result<Json<SaveResponse>, AppError> {
    let history = state.history.lock().await;
    history.save(&state.config.history_path).await?;
    Ok(Json(SaveResponse {
        saved: history.len(),
        path: state.config.history_path.display().to_string(),
        message: "Analysis saved successfully!".to_string(),
    }))
}

/// POST /api/v1/history/load
/// Replaces the session history with the saved one.
pub async fn handle_load_history(
    State(state): State<AppState>,
) -> Result<Json<LoadResponse>, AppError> {
    let mut history = state.history.lock().await;
    let loaded = history.load(&state.config.history_path).await?;
    Ok(Json(LoadResponse {
        loaded,
        entries: history.entries().to_vec(),
        message: "Previous analysis loaded successfully!".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::routes::build_router;
    use crate::test_support::StubExtractor;

    fn state_at(path: std::path::PathBuf) -> AppState {
        AppState::new(Config::for_tests(path), None, Arc::new(StubExtractor))
    }

    fn entry(ts: &str, pct: f64, keywords: &[&str]) -> HistoryEntry {
        HistoryEntry {
            timestamp: ts.to_string(),
            match_percentage: pct,
            missing_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_save_then_load_in_new_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume_analysis.json");

        let first = state_at(path.clone());
        {
            let mut history = first.history.lock().await;
            history.append(entry("2024-06-01 08:00:00", 91.0, &["Docker"]));
            history.append(entry("2024-06-01 08:10:00", 67.5, &["Go", "gRPC"]));
            history.append(entry("2024-06-01 08:20:00", 30.0, &[]));
        }
        let (status, body) = call(build_router(first.clone()), "POST", "/api/v1/history/save").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["saved"], 3);

        let second = state_at(path);
        let (status, body) = call(build_router(second.clone()), "POST", "/api/v1/history/load").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["loaded"], 3);

        let restored = second.history.lock().await;
        let original = first.history.lock().await;
        assert_eq!(restored.entries(), original.entries());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_saves_and_loads_all_succeed() {
        let dir = tempdir().unwrap();
        let state = state_at(dir.path().join("resume_analysis.json"));
        {
            let mut history = state.history.lock().await;
            history.append(entry("2024-06-01 08:00:00", 91.0, &["Docker"]));
            history.append(entry("2024-06-01 08:10:00", 67.5, &[]));
        }
        call(build_router(state.clone()), "POST", "/api/v1/history/save").await;

        let mut tasks = Vec::new();
        for i in 0..16 {
            let app = build_router(state.clone());
            let uri = if i % 2 == 0 { "/api/v1/history/save" } else { "/api/v1/history/load" };
            tasks.push(tokio::spawn(async move { call(app, "POST", uri).await.0 }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::OK);
        }
        assert_eq!(state.history.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_load_before_any_save_is_not_found() {
        let dir = tempdir().unwrap();
        let state = state_at(dir.path().join("resume_analysis.json"));
        let (status, body) = call(build_router(state), "POST", "/api/v1/history/load").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["message"], "No saved analysis found.");
    }

    #[tokio::test]
    async fn test_load_of_corrupt_file_is_unprocessable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resume_analysis.json");
        std::fs::write(&path, "definitely not json").unwrap();
        let state = state_at(path);
        state.history.lock().await.append(entry("keep", 10.0, &[]));

        let (status, _) = call(build_router(state.clone()), "POST", "/api/v1/history/load").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.history.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_export_is_text_attachment() {
        let dir = tempdir().unwrap();
        let state = state_at(dir.path().join("h.json"));
        state
            .history
            .lock()
            .await
            .append(entry("2024-06-01 08:00:00", 91.0, &["Docker", "Kubernetes"]));

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/history/export")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"evaluation_history.txt\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            String::from_utf8(bytes.to_vec()).unwrap(),
            "Evaluation 1 - 2024-06-01 08:00:00\nJD Match: 91.0%\nMissing Keywords: Docker, Kubernetes\n\n"
        );
    }

    #[tokio::test]
    async fn test_get_and_reset_history() {
        let dir = tempdir().unwrap();
        let state = state_at(dir.path().join("h.json"));
        state.history.lock().await.append(entry("a", 50.0, &["SQL"]));

        let (status, body) = call(build_router(state.clone()), "GET", "/api/v1/history").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["count"], 1);
        assert_eq!(body["entries"][0]["missing_keywords"][0], "SQL");

        let (status, _) = call(build_router(state.clone()), "DELETE", "/api/v1/history").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.history.lock().await.is_empty());
    }
}

//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::evaluation::evaluator::{compare_resumes, evaluate_resume, ComparisonItem};
use crate::evaluation::models::{EvaluationResult, StrengthProfile};
use crate::extraction::UploadedDocument;
use crate::history::HistoryEntry;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateParams {
    #[serde(default = "default_true")]
    pub suggestions: bool,
    /// Echo the raw model response.
    #[serde(default)]
    pub debug: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub evaluation: EvaluationResult,
    pub match_display: String,
    pub strength_profile: StrengthProfile,
    pub suggestions: Option<String>,
    pub history_entry: HistoryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub results: Vec<ComparisonItem>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fields accepted by the upload endpoints.
#[derive(Debug, Default)]
struct UploadForm {
    job_description: Option<String>,
    documents: Vec<UploadedDocument>,
}

impl UploadForm {
    fn job_description(&self) -> Result<&str, AppError> {
        self.job_description
            .as_deref()
            .map(str::trim)
            .filter(|jd| !jd.is_empty())
            .ok_or_else(|| AppError::Validation("Paste the job description first.".to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
///
/// Multipart: `job_description` (text) and exactly one `resume` (PDF file).
/// On success the evaluation is appended to the session history.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Query(params): Query<EvaluateParams>,
    multipart: Multipart,
) -> Result<Json<EvaluateResponse>, AppError> {
    let llm = state.llm()?;
    let form = read_upload_form(multipart).await?;
    let jd_text = form.job_description()?;

    let document = match form.documents.as_slice() {
        [] => {
            return Err(AppError::Validation(
                "Please upload a PDF resume to proceed.".to_string(),
            ))
        }
        [document] => document,
        several => {
            return Err(AppError::Validation(format!(
                "Upload a single resume ({} received); use /api/v1/evaluations/compare for several.",
                several.len()
            )))
        }
    };
    info!(
        "Evaluating '{}' ({} bytes) against a {}-character job description",
        document.filename,
        document.bytes.len(),
        jd_text.len()
    );

    let resume_text = state.extractor.extract(document).await?;
    let outcome = evaluate_resume(llm, &resume_text, jd_text, params.suggestions).await?;

    let history_entry = HistoryEntry::from_evaluation(&outcome.result, Local::now());
    state.history.lock().await.append(history_entry.clone());

    Ok(Json(EvaluateResponse {
        match_display: outcome.result.match_display(),
        strength_profile: outcome.result.strength_profile(),
        evaluation: outcome.result,
        suggestions: outcome.suggestions,
        history_entry,
        raw_response: params.debug.then_some(outcome.raw_response),
    }))
}

/// POST /api/v1/evaluations/compare
///
/// Multipart: `job_description` and one or more `resumes` files.
/// Results are not added to history.
pub async fn handle_compare(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>, AppError> {
    let llm = state.llm()?;
    let form = read_upload_form(multipart).await?;
    let jd_text = form.job_description()?;

    if form.documents.is_empty() {
        return Err(AppError::Validation(
            "Upload at least one resume to compare.".to_string(),
        ));
    }

    let results = compare_resumes(llm, state.extractor.as_ref(), &form.documents, jd_text).await;
    let succeeded = results.iter().filter(|r| r.is_ok()).count();

    Ok(Json(CompareResponse {
        failed: results.len() - succeeded,
        succeeded,
        results,
    }))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job description: {e}")))?;
                form.job_description = Some(text);
            }
            "resume" | "resumes" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid upload '{filename}': {e}")))?;
                // browsers send an empty part for an untouched file input
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.documents
                    .push(UploadedDocument::new(filename, content_type, bytes));
            }
            other => debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    Ok(form)
}

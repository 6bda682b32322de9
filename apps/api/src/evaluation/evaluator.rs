//! Evaluation pipeline.
//!
//! Single: prompt → generate → parse → (optional) suggestions.
//! Comparison: the same per document, sequentially, each document's outcome independent.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::{AppError, ErrorBody};
use crate::evaluation::models::EvaluationResult;
use crate::evaluation::parser::parse_evaluation;
use crate::evaluation::prompts::build_evaluation_prompt;
use crate::evaluation::suggestions::suggest_improvements_lenient;
use crate::extraction::{TextExtractor, UploadedDocument};
use crate::llm_client::ModelClient;

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub result: EvaluationResult,
    pub suggestions: Option<String>,
    pub raw_response: String,
}

/// One row of a comparison run.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonItem {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: ComparisonOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Ok {
        match_percentage: f64,
        match_display: String,
        missing_keywords: Vec<String>,
    },
    Error {
        error: ErrorBody,
    },
}

impl ComparisonItem {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ComparisonOutcome::Ok { .. })
    }
}

/// Scores already-extracted resume text against a job description.
pub async fn evaluate_resume(
    llm: &dyn ModelClient,
    resume_text: &str,
    jd_text: &str,
    with_suggestions: bool,
) -> Result<EvaluationOutcome, AppError> {
    let prompt = build_evaluation_prompt(resume_text, jd_text);
    let raw_response = llm.generate(&prompt).await?;
    let result = parse_evaluation(&raw_response)?;

    info!(
        "Evaluation complete: match={}, missing_keywords={}",
        result.match_display(),
        result.missing_keywords.len()
    );

    let suggestions = if with_suggestions {
        suggest_improvements_lenient(llm, &result.missing_keywords, jd_text).await
    } else {
        None
    };

    Ok(EvaluationOutcome {
        result,
        suggestions,
        raw_response,
    })
}

/// Scores each document in turn. A failure is recorded on its own row and
/// does not stop the remaining documents.
pub async fn compare_resumes(
    llm: &dyn ModelClient,
    extractor: &dyn TextExtractor,
    documents: &[UploadedDocument],
    jd_text: &str,
) -> Vec<ComparisonItem> {
    let mut items = Vec::with_capacity(documents.len());

    for document in documents {
        let outcome = match score_document(llm, extractor, document, jd_text).await {
            Ok(result) => ComparisonOutcome::Ok {
                match_display: result.match_display(),
                match_percentage: result.match_percentage,
                missing_keywords: result.missing_keywords,
            },
            Err(e) => {
                warn!("Comparison of '{}' failed: {e}", document.filename);
                ComparisonOutcome::Error { error: e.body() }
            }
        };
        items.push(ComparisonItem {
            filename: document.filename.clone(),
            outcome,
        });
    }

    info!(
        "Compared {} resumes ({} succeeded)",
        items.len(),
        items.iter().filter(|i| i.is_ok()).count()
    );
    items
}

async fn score_document(
    llm: &dyn ModelClient,
    extractor: &dyn TextExtractor,
    document: &UploadedDocument,
    jd_text: &str,
) -> Result<EvaluationResult, AppError> {
    let text = extractor.extract(document).await?;
    let outcome = evaluate_resume(llm, &text, jd_text, false).await?;
    Ok(outcome.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::test_support::{evaluation_json, pdf_upload, ScriptedModel, StubExtractor};

    #[tokio::test]
    async fn test_evaluate_parses_model_output() {
        let llm = ScriptedModel::new(vec![Ok(evaluation_json(91.0, &["Docker"]))]);
        let outcome = evaluate_resume(&llm, "resume", "jd", false).await.unwrap();
        assert_eq!(outcome.result.match_percentage, 91.0);
        assert_eq!(outcome.result.missing_keywords, vec!["Docker"]);
        assert!(outcome.suggestions.is_none());
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts()[0].contains("resume: resume"));
    }

    #[tokio::test]
    async fn test_evaluate_requests_suggestions_for_missing_keywords() {
        let llm = ScriptedModel::new(vec![
            Ok(evaluation_json(60.0, &["Kafka"])),
            Ok("- Mention Kafka in your streaming project".to_string()),
        ]);
        let outcome = evaluate_resume(&llm, "resume", "jd", true).await.unwrap();
        assert_eq!(
            outcome.suggestions.as_deref(),
            Some("- Mention Kafka in your streaming project")
        );
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_suggestion_call_when_nothing_missing() {
        let llm = ScriptedModel::new(vec![Ok(evaluation_json(99.0, &[]))]);
        let outcome = evaluate_resume(&llm, "resume", "jd", true).await.unwrap();
        assert!(outcome.suggestions.is_none());
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_suggestion_failure_does_not_fail_evaluation() {
        let llm = ScriptedModel::new(vec![
            Ok(evaluation_json(60.0, &["Kafka"])),
            Err(LlmError::Api {
                status: 429,
                message: "quota".to_string(),
            }),
        ]);
        let outcome = evaluate_resume(&llm, "resume", "jd", true).await.unwrap();
        assert_eq!(outcome.result.match_percentage, 60.0);
        assert!(outcome.suggestions.is_none());
    }

    #[tokio::test]
    async fn test_unparseable_output_is_parse_error() {
        let llm = ScriptedModel::new(vec![Ok("I cannot help with that.".to_string())]);
        let err = evaluate_resume(&llm, "resume", "jd", false).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_is_llm_error() {
        let llm = ScriptedModel::new(vec![Err(LlmError::EmptyContent)]);
        let err = evaluate_resume(&llm, "resume", "jd", false).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_comparison_isolates_failures() {
        let llm = ScriptedModel::new(vec![
            Ok(evaluation_json(80.0, &["Go"])),
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok("no json here".to_string()),
            Ok(evaluation_json(45.0, &[])),
        ]);
        let documents = vec![
            pdf_upload("alice.pdf", "Alice resume"),
            pdf_upload("bob.pdf", "Bob resume"),
            pdf_upload("carol.pdf", "Carol resume"),
            pdf_upload("notes.docx", "not a pdf"),
            pdf_upload("dave.pdf", "Dave resume"),
        ];

        let items = compare_resumes(&llm, &StubExtractor, &documents, "jd").await;

        let filenames: Vec<&str> = items.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(
            filenames,
            vec!["alice.pdf", "bob.pdf", "carol.pdf", "notes.docx", "dave.pdf"]
        );
        let codes: Vec<&str> = items
            .iter()
            .map(|i| match &i.outcome {
                ComparisonOutcome::Ok { .. } => "OK",
                ComparisonOutcome::Error { error } => error.code,
            })
            .collect();
        assert_eq!(
            codes,
            vec!["OK", "LLM_ERROR", "PARSE_ERROR", "EXTRACTION_ERROR", "OK"]
        );
        // extraction failure happens before a model call is spent
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_comparison_item_serialization() {
        let llm = ScriptedModel::new(vec![Ok(evaluation_json(80.0, &["Go"]))]);
        let documents = vec![pdf_upload("alice.pdf", "Alice resume")];
        let items = compare_resumes(&llm, &StubExtractor, &documents, "jd").await;
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["filename"], "alice.pdf");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["match_display"], "80.0%");
        assert_eq!(json["missing_keywords"][0], "Go");
    }
}

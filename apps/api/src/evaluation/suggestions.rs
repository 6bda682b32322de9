//! Keyword improvement suggestions: a second, free-text model call.

use tracing::{info, warn};

use crate::evaluation::prompts::build_suggestions_prompt;
use crate::llm_client::{LlmError, ModelClient};

/// Asks the model how to work the missing keywords into the resume.
/// Returns `Ok(None)` when nothing is missing.
pub async fn suggest_improvements(
    llm: &dyn ModelClient,
    missing_keywords: &[String],
    jd_text: &str,
) -> Result<Option<String>, LlmError> {
    if missing_keywords.is_empty() {
        return Ok(None);
    }
    let prompt = build_suggestions_prompt(missing_keywords, jd_text);
    let text = llm.generate(&prompt).await?;
    info!(
        "Generated suggestions for {} missing keywords",
        missing_keywords.len()
    );
    Ok(Some(text.trim().to_string()))
}

/// Like `suggest_improvements`, but a failed call only logs and yields `None`.
pub async fn suggest_improvements_lenient(
    llm: &dyn ModelClient,
    missing_keywords: &[String],
    jd_text: &str,
) -> Option<String> {
    match suggest_improvements(llm, missing_keywords, jd_text).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!("Suggestion generation failed, continuing without: {e}");
            None
        }
    }
}

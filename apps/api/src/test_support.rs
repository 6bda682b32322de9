//! Stubs shared by handler and pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::extraction::{ExtractionError, TextExtractor, UploadedDocument};
use crate::llm_client::{LlmError, ModelClient};

/// Replays canned model responses in order and records every prompt it was sent.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Treats the upload bytes as the already-extracted text. Applies the same
/// "is this a PDF" check as the real extractor.
pub struct StubExtractor;

#[async_trait]
impl TextExtractor for StubExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        if !document.declared_pdf() {
            return Err(ExtractionError::NotPdf {
                filename: document.filename.clone(),
            });
        }
        let text = String::from_utf8_lossy(&document.bytes).to_string();
        if text.trim().is_empty() {
            return Err(ExtractionError::NoText {
                filename: document.filename.clone(),
            });
        }
        Ok(text)
    }
}

pub fn pdf_upload(filename: &str, text: &str) -> UploadedDocument {
    let content_type = if filename.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };
    UploadedDocument::new(
        filename,
        Some(content_type.to_string()),
        Bytes::from(text.to_string()),
    )
}

/// A well-formed model reply, scores encoded as strings the way the model tends to.
pub fn evaluation_json(match_percentage: f64, missing: &[&str]) -> String {
    let keywords = serde_json::to_string(missing).unwrap();
    format!(
        r#"{{"JD Match": "{match_percentage}%", "MissingKeywords": {keywords}, "Profile Summary": "Solid candidate", "TechnicalSkills": "80", "SoftSkills": "70", "Experience": "75", "Education": "90", "Projects": "60"}}"#
    )
}

/// Multipart part for `multipart_body`.
pub enum FormPart<'a> {
    Text { name: &'a str, value: &'a str },
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        body: &'a str,
    },
}

pub const BOUNDARY: &str = "smartresume-test-boundary";

pub fn multipart_body(parts: &[FormPart<'_>]) -> String {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        match part {
            FormPart::Text { name, value } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                ));
            }
            FormPart::File {
                name,
                filename,
                content_type,
                body: content,
            } => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n{content}\r\n"
                ));
            }
        }
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

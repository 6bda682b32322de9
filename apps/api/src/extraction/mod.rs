//! PDF text extraction for uploaded resumes.
//!
//! Pages are extracted one at a time and concatenated in page order with no separator.
//! Each page gets a fresh layout pass, so its text starts on a new line of its own and
//! words never run together across a page break. `pdf-extract` is CPU bound and
//! may panic on hostile input, so it runs on the blocking pool and a panic is reported as
//! a malformed document instead of tearing down the request task.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error, PartialEq)]
pub enum ExtractionError {
    #[error("'{filename}' is not a PDF file")]
    NotPdf { filename: String },

    #[error("Error reading PDF '{filename}': {message}")]
    Malformed { filename: String, message: String },

    #[error("'{filename}' contains no extractable text")]
    NoText { filename: String },
}

/// A file received from the client, before any parsing.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// True when either the declared content type or the file extension says PDF.
    pub fn declared_pdf(&self) -> bool {
        let by_type = self
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE))
            .unwrap_or(false);
        let by_name = self.filename.to_ascii_lowercase().ends_with(".pdf");
        by_type || by_name
    }
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}

/// Default extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        if !document.declared_pdf() {
            return Err(ExtractionError::NotPdf {
                filename: document.filename.clone(),
            });
        }

        let filename = document.filename.clone();
        let bytes = document.bytes.clone();
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&filename, &bytes))
            .await
            .map_err(|e| ExtractionError::Malformed {
                filename: document.filename.clone(),
                message: format!("extractor aborted: {e}"),
            })??;

        debug!(
            "Extracted {} characters from '{}'",
            text.len(),
            document.filename
        );
        Ok(text)
    }
}

/// Extracts the text of every page, concatenated in page order.
pub fn extract_pdf_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractionError::NotPdf {
            filename: filename.to_string(),
        });
    }

    let pages =
        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| ExtractionError::Malformed {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;
    debug!("'{filename}' has {} pages", pages.len());

    let text = join_pages(&pages);
    if text.trim().is_empty() {
        return Err(ExtractionError::NoText {
            filename: filename.to_string(),
        });
    }
    Ok(text)
}

fn join_pages(pages: &[String]) -> String {
    pages.concat()
}

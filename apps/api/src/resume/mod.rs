//! Resume text cache — the PDF resume is read and extracted once at startup.
//!
//! Loading never fails: every error path ends in the placeholder text, so the
//! chat handler always has something to embed in the system prompt.

use std::path::Path;

use thiserror::Error;
use tracing::{error, info, warn};

/// Stored in place of the resume whenever the file cannot be read or parsed.
pub const FALLBACK_RESUME_TEXT: &str = "The resume file is currently unavailable or invalid.";

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The bytes are not a parseable PDF document (e.g. a text file saved as `.pdf`).
    #[error("malformed PDF document: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("text extraction failed: {0}")]
    Other(String),
}

/// Immutable result of the one-time resume load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeText {
    pub text: String,
    pub is_placeholder: bool,
}

impl ResumeText {
    pub fn extracted(text: String) -> Self {
        Self {
            text,
            is_placeholder: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            text: FALLBACK_RESUME_TEXT.to_string(),
            is_placeholder: true,
        }
    }
}

/// Extracts plain text from PDF bytes, classifying failures by the library's error variant.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| match e {
        pdf_extract::OutputError::PdfError(inner) => ExtractError::Malformed(inner.to_string()),
        pdf_extract::OutputError::IoError(inner) => ExtractError::Io(inner),
        other => ExtractError::Other(other.to_string()),
    })
}

/// Reads and extracts the resume at `path`. Extraction runs on the blocking pool;
/// a panic inside the PDF library is reported as `ExtractError::Other`.
pub async fn read_resume(path: &Path) -> Result<String, ExtractError> {
    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| ExtractError::Other(format!("extraction task aborted: {e}")))?
}

/// Loads the resume once. Always returns a usable `ResumeText`.
pub async fn load_resume(path: &Path) -> ResumeText {
    match read_resume(path).await {
        Ok(text) => {
            info!(
                "Resume loaded into memory ({} chars) from {}",
                text.chars().count(),
                path.display()
            );
            ResumeText::extracted(text)
        }
        Err(ExtractError::Malformed(detail)) => {
            warn!(
                "{} is not a valid PDF (likely a placeholder file): {detail}",
                path.display()
            );
            warn!("Replace it with the real PDF resume so the assistant can read it");
            ResumeText::placeholder()
        }
        Err(e) => {
            error!("Error loading resume PDF from {}: {e}", path.display());
            ResumeText::placeholder()
        }
    }
}

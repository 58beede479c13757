//! Failure taxonomy
//!
//! Every failing operation maps to one of these variants and is surfaced to
//! the UI as an inline message. Nothing here is retried automatically; the
//! session stays usable after any single failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// API key absent or rejected by the service
    #[error("Gemini API not configured: {0}")]
    Configuration(String),

    /// Malformed, encrypted, or text-less PDF
    #[error("Error extracting text from PDF: {0}")]
    Extraction(String),

    /// Extracted text too short to summarize meaningfully
    #[error("Not enough text to summarize ({got} chars, need at least {min})")]
    InputTooShort { got: usize, min: usize },

    /// Response withheld by the safety filter
    #[error("Summary generation was blocked. Reason: {reason}. Safety ratings: {ratings}")]
    ContentBlocked { reason: String, ratings: String },

    #[error("Gemini API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network or service failure on the summarization call
    #[error("Gemini API error: {0}")]
    Transient(String),

    /// Viewer could not display the uploaded bytes
    #[error("Could not display PDF: {0}")]
    Render(String),
}

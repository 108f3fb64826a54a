//! User-facing pipeline errors.
//!
//! DESIGN
//! ======
//! Every failure a session can surface is one `PipelineError`. Its
//! `Display` text is the message shown to the user; the stable code and the
//! retryable flag are for callers that want to branch without matching on
//! text. Transport causes ride along for logging but stay out of the
//! message.

use crate::export::ExportError;

/// Stable machine-readable classification of an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A prompt was submitted with no text.
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    /// The generation request failed or came back with a non-success status.
    #[error("Server is temporarily unavailable. Please try again later.")]
    ServiceUnavailable { cause: String },

    /// The generation service answered but without usable diagram source.
    #[error("No result returned from the backend.")]
    EmptyResult,

    /// Fetching, rasterizing, or saving the image failed.
    #[error("Failed to download flowchart: {0}")]
    Export(#[from] ExportError),
}

impl ErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::ServiceUnavailable { .. } => "E_SERVICE_UNAVAILABLE",
            Self::EmptyResult => "E_EMPTY_RESULT",
            Self::Export(_) => "E_EXPORT",
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::EmptyPrompt)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

//! Generation service client: prompt in, PlantUML source out.
//!
//! DESIGN
//! ======
//! The service is an external collaborator reached with
//! `POST {"prompt": ...}` and answering `{"result": ...}`. The
//! [`DiagramGenerator`] trait is the seam the controller depends on so
//! tests can swap the HTTP client for canned responses. Clients return the
//! raw `result` text; fence stripping is a separate pure step
//! ([`strip_fences`]) applied when the session accepts the result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::HttpTimeouts;
use crate::error::PipelineError;

const FENCE: &str = "```";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The request never produced a response.
    #[error("generation request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("generation service returned status {status}")]
    Status { status: u16, body: String },

    /// The service answered 2xx without a usable `result`.
    #[error("generation response had no usable result")]
    NoResult,

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl From<GenerationError> for PipelineError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::NoResult => Self::EmptyResult,
            other => Self::ServiceUnavailable { cause: other.to_string() },
        }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Async contract with the generation service. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DiagramGenerator: Send + Sync {
    /// Ask the service for diagram source describing `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] on transport failure, non-success
    /// status, or a response without a usable `result`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
}

/// [`DiagramGenerator`] backed by the HTTP generation service.
pub struct HttpGenerator {
    http: reqwest::Client,
    url: String,
}

impl HttpGenerator {
    /// # Errors
    ///
    /// Returns [`GenerationError::HttpClientBuild`] if the client cannot be built.
    pub fn new(url: impl Into<String>, timeouts: HttpTimeouts) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder().connect_timeout(timeouts.connect);
        if let Some(request) = timeouts.request {
            builder = builder.timeout(request);
        }
        let http = builder
            .build()
            .map_err(|e| GenerationError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl DiagramGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(&self.url)
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerationError::Status { status: status.as_u16(), body: text });
        }
        debug!(bytes = text.len(), "generation response received");
        parse_generation_body(&text)
    }
}

/// Pull the `result` string out of a generation response body.
///
/// # Errors
///
/// Returns [`GenerationError::NoResult`] when the body is not JSON, or
/// `result` is missing, null, not a string, or empty.
pub fn parse_generation_body(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "generation response is not the expected JSON envelope");
        GenerationError::NoResult
    })?;
    match parsed.result {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Ok(text),
        _ => Err(GenerationError::NoResult),
    }
}

// =============================================================================
// FENCE STRIPPING
// =============================================================================

/// Remove a Markdown code fence around generated source, then trim.
///
/// A leading fence-open may carry a language tag (`plantuml`, `uml`, ...)
/// which is dropped with it. A trailing fence-close is dropped. Text with no
/// fence markers is only trimmed.
#[must_use]
pub fn strip_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !is_tag_char(c))
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest;
    }
    body.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

#[cfg(test)]
#[path = "generation_test.rs"]
mod tests;

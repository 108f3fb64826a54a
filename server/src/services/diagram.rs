//! Diagram service: prompt → chat model → `PlantUML` source.
//!
//! DESIGN
//! ======
//! One system instruction pins the model to diagram-only output, the user's
//! prompt follows as the single user message. The model text is returned
//! verbatim; fence stripping and empty-result handling belong to the client.

use tracing::{info, warn};

use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};

pub const SYSTEM_PROMPT: &str = "ONLY Generate a PlantUML diagram and no other text or comments.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,
    #[error("{0}")]
    Llm(#[from] LlmError),
}

impl GenerateError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::Llm(e) => e.error_code(),
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Ask the model for a diagram describing `prompt`.
///
/// # Errors
///
/// [`GenerateError::EmptyPrompt`] for `""`; [`GenerateError::Llm`] when the
/// model call fails.
pub async fn generate_diagram(llm: &dyn LlmChat, max_tokens: u32, prompt: &str) -> Result<String, GenerateError> {
    if prompt.is_empty() {
        return Err(GenerateError::EmptyPrompt);
    }
    info!(prompt_len = prompt.len(), "diagram: prompt received");

    let messages = build_messages(prompt);
    let response = llm.chat(max_tokens, &messages).await.map_err(|e| {
        warn!(error = %e, code = e.error_code(), "diagram: model completion failed");
        GenerateError::from(e)
    })?;

    info!(
        model = %response.model,
        finish_reason = %response.finish_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "diagram: completion received"
    );
    Ok(response.text)
}

fn build_messages(prompt: &str) -> [Message; 2] {
    [Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}

#[cfg(test)]
#[path = "diagram_test.rs"]
mod tests;

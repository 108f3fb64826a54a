//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the chat model behind the `LlmChat` trait so handlers can be driven
//! by a mock in tests.

use std::sync::Arc;

use crate::llm::LlmChat;

pub const DEFAULT_LLM_MAX_TOKENS: u32 = 4096;

/// Clone is required by Axum; the model handle is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmChat>,
    pub max_tokens: u32,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }
}

/// `LLM_MAX_TOKENS`, falling back to the default when unset or unparseable.
#[must_use]
pub fn max_tokens_from_env() -> u32 {
    match std::env::var("LLM_MAX_TOKENS") {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!(value = %raw, "invalid LLM_MAX_TOKENS; using default");
                DEFAULT_LLM_MAX_TOKENS
            }
        },
        Err(_) => DEFAULT_LLM_MAX_TOKENS,
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    use crate::llm::types::{ChatResponse, LlmError, Message};

    /// Chat model replaying canned results, recording each message list.
    pub struct MockLlm {
        responses: Mutex<Vec<Result<ChatResponse, LlmError>>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl MockLlm {
        #[must_use]
        pub fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
            Self { responses: Mutex::new(responses), seen: Mutex::new(Vec::new()) }
        }

        #[must_use]
        pub fn seen(&self) -> Vec<Vec<Message>> {
            self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmChat for MockLlm {
        async fn chat(&self, _max_tokens: u32, messages: &[Message]) -> Result<ChatResponse, LlmError> {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(messages.to_vec());
            let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
            if responses.is_empty() { Ok(text_response("@startuml\n@enduml")) } else { responses.remove(0) }
        }
    }

    #[must_use]
    pub fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            text: text.into(),
            model: "mock".into(),
            finish_reason: "stop".into(),
            input_tokens: 3,
            output_tokens: 7,
        }
    }

    /// `AppState` around a mock model.
    #[must_use]
    pub fn test_app_state(llm: Arc<MockLlm>) -> AppState {
        AppState::new(llm, 256)
    }
}

//! OpenAI-compatible chat completions client.
//!
//! Talks to `/chat/completions` either on an `OpenAI`-style base URL with
//! bearer auth, or on an Azure deployment with an `api-key` header and an
//! `api-version` query parameter.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::{LlmProviderKind, LlmTimeouts};
use super::types::{ChatResponse, LlmError, Message};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    provider: LlmProviderKind,
    api_version: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(
        provider: LlmProviderKind,
        api_key: String,
        base_url: String,
        api_version: String,
        timeouts: LlmTimeouts,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, api_key, base_url, provider, api_version })
    }

    /// Endpoint for a chat completion against `model`.
    #[must_use]
    pub fn endpoint(&self, model: &str) -> String {
        match self.provider {
            LlmProviderKind::OpenAi => format!("{}/chat/completions", self.base_url),
            LlmProviderKind::Azure => format!(
                "{}/openai/deployments/{model}/chat/completions?api-version={}",
                self.base_url, self.api_version
            ),
        }
    }

    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, non-200 status, or an
    /// unparseable body.
    pub async fn chat(&self, model: &str, max_tokens: u32, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let body = CcRequest { model, max_tokens, messages };
        let text = self.send_json(&self.endpoint(model), &body).await?;
        parse_chat_completions_response(&text)
    }

    async fn send_json(&self, url: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let request = self.http.post(url).json(body);
        let request = match self.provider {
            LlmProviderKind::OpenAi => request.bearer_auth(&self.api_key),
            LlmProviderKind::Azure => request.header("api-key", &self.api_key),
        };
        let response = request
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let input_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop")
        .to_string();
    let text = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(ChatResponse { text, model, finish_reason, input_tokens, output_tokens })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

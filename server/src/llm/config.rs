//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    /// `OpenAI` or any compatible `/chat/completions` endpoint, bearer auth.
    OpenAi,
    /// Azure `OpenAI` deployment, `api-key` header and `api-version` query.
    Azure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    /// Model name; for Azure this is the deployment name.
    pub model: String,
    /// API base for `OpenAI`, resource endpoint for Azure. No trailing slash.
    pub base_url: String,
    pub api_version: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - the API key, in the variable named by `LLM_API_KEY_ENV`
    ///   (default `OPENAI_API_KEY`)
    /// - `LLM_BASE_URL` when `LLM_PROVIDER=azure`
    ///
    /// Optional:
    /// - `LLM_PROVIDER`: `openai` (default) or `azure`
    /// - `LLM_MODEL`: default `gpt-4o`
    /// - `LLM_BASE_URL`: default `OpenAI` API base URL
    /// - `LLM_API_VERSION`: Azure only, default `2024-06-01`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when the key is absent and
    /// [`LlmError::ConfigParse`] for unknown providers, a missing Azure
    /// endpoint, or unparseable timeouts.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = parse_provider(env_opt("LLM_PROVIDER").as_deref())?;

        let key_var = env_opt("LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = env_opt(&key_var).ok_or(LlmError::MissingApiKey { var: key_var })?;

        let model = env_opt("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = match (provider, env_opt("LLM_BASE_URL")) {
            (_, Some(url)) => url.trim_end_matches('/').to_string(),
            (LlmProviderKind::OpenAi, None) => DEFAULT_OPENAI_BASE_URL.to_string(),
            (LlmProviderKind::Azure, None) => {
                return Err(LlmError::ConfigParse("LLM_BASE_URL is required for the azure provider".into()));
            }
        };
        let api_version = env_opt("LLM_API_VERSION").unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string());
        let timeouts = LlmTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { provider, api_key, model, base_url, api_version, timeouts })
    }
}

/// Set, non-blank value of `key`.
fn env_opt(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, LlmError> {
    match env_opt(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| LlmError::ConfigParse(format!("{key}={raw:?}: {e}"))),
    }
}

fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.unwrap_or("openai") {
        "openai" => Ok(LlmProviderKind::OpenAi),
        "azure" => Ok(LlmProviderKind::Azure),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

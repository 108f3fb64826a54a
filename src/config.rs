//! Pipeline configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::reference::DEFAULT_RENDER_BASE_URL;

pub const DEFAULT_GENERATE_URL: &str = "http://localhost:8000/generate-flowchart";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Name of the exported raster file.
pub const EXPORT_FILE_NAME: &str = "flowchart.png";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue { var: &'static str, value: String, reason: String },

    #[error("environment variable {var} is not valid unicode")]
    NotUnicode { var: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    /// `None` leaves request duration to the transport.
    pub request: Option<Duration>,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS), request: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub generate_url: String,
    pub render_base_url: String,
    pub out_dir: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generate_url: DEFAULT_GENERATE_URL.to_string(),
            render_base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            out_dir: PathBuf::from("."),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl PipelineConfig {
    /// Build typed pipeline config from environment variables.
    ///
    /// All optional:
    /// - `FLOWCHART_GENERATE_URL`: generation endpoint
    /// - `FLOWCHART_RENDER_BASE_URL`: render service base, token is appended
    /// - `FLOWCHART_OUT_DIR`: directory the PNG export is written to
    /// - `FLOWCHART_CONNECT_TIMEOUT_SECS`: default 10
    /// - `FLOWCHART_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let generate_url = env_string("FLOWCHART_GENERATE_URL")?.unwrap_or(defaults.generate_url);
        let render_base_url = env_string("FLOWCHART_RENDER_BASE_URL")?
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.render_base_url);
        let out_dir = env_string("FLOWCHART_OUT_DIR")?.map_or(defaults.out_dir, PathBuf::from);

        let connect_secs = env_secs("FLOWCHART_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_secs = env_secs("FLOWCHART_REQUEST_TIMEOUT_SECS")?;
        let timeouts = HttpTimeouts {
            connect: Duration::from_secs(connect_secs),
            request: request_secs.map(Duration::from_secs),
        };

        Ok(Self { generate_url, render_base_url, out_dir, timeouts })
    }

    /// Full path of the export artifact.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.out_dir.join(EXPORT_FILE_NAME)
    }
}

fn env_string(var: &'static str) -> Result<Option<String>, ConfigError> {
    match std::env::var(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { var }),
    }
}

fn env_secs(var: &'static str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = env_string(var)? else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue { var, value: raw, reason: e.to_string() })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

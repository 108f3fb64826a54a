mod llm;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("LLM client not configured: {0}")]
    Llm(#[from] llm::types::LlmError),
    #[error("invalid PORT {value:?}: {source}")]
    Port { value: String, source: std::num::ParseIntError },
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "flowchart-server exiting");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // Fatal: the generation endpoint is the whole service.
    let client = llm::LlmClient::from_env()?;
    tracing::info!(model = client.model(), "LLM client initialized");

    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|source| StartupError::Port { value: raw.clone(), source })?,
        Err(_) => DEFAULT_PORT,
    };

    let state = state::AppState::new(Arc::new(client), state::max_tokens_from_env());
    let app = routes::app(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;

    tracing::info!(%port, "flowchart-server listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}

//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the generation endpoints under a single Axum router. Browser
//! front-ends on the configured origins may call the API directly.

pub mod flowchart;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Full application router.
pub fn app(state: AppState) -> Router {
    let origins = allowed_origins(
        std::env::var("CORS_ALLOWED_ORIGINS")
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ALLOWED_ORIGINS),
    );
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(flowchart::root))
        .route("/generate-flowchart", post(flowchart::generate_flowchart))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse a comma-separated origin list, skipping blanks and invalid entries.
pub(crate) fn allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

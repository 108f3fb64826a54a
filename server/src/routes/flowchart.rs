//! Flowchart generation routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::services::diagram::{self, GenerateError};
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the flowchart generator API";

#[derive(Debug, Deserialize)]
pub struct FlowchartRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowchartResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WelcomeResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorDetail>);

/// `GET /`: service banner.
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: WELCOME_MESSAGE.to_string() })
}

/// `POST /generate-flowchart`: generate `PlantUML` source for a prompt.
pub async fn generate_flowchart(
    State(state): State<AppState>,
    Json(body): Json<FlowchartRequest>,
) -> Result<Json<FlowchartResponse>, ApiError> {
    let result = diagram::generate_diagram(state.llm.as_ref(), state.max_tokens, &body.prompt)
        .await
        .map_err(api_error)?;
    Ok(Json(FlowchartResponse { result }))
}

fn api_error(err: GenerateError) -> ApiError {
    let (status, detail) = match &err {
        GenerateError::EmptyPrompt => (StatusCode::BAD_REQUEST, err.to_string()),
        GenerateError::Llm(e) => {
            error!(error = %e, code = err.error_code(), retryable = err.retryable(), "generate-flowchart failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"))
        }
    };
    (status, Json(ErrorDetail { detail }))
}

#[cfg(test)]
#[path = "flowchart_test.rs"]
mod tests;

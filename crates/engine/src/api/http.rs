//! HTTP routes.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

use crate::app::App;
use crate::infrastructure::correlation::CorrelationId;
use crate::use_cases::{ContinueStoryError, ContinueStoryInput, ContinueStoryOutput};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/continue_story", post(continue_story))
}

async fn health() -> &'static str {
    "OK"
}

async fn continue_story(
    State(app): State<Arc<App>>,
    body: Bytes,
) -> Result<Json<ContinueStoryOutput>, ApiError> {
    let correlation_id = CorrelationId::generate();
    let input = ContinueStoryInput::from_json_lenient(&body);
    let span = tracing::info_span!(
        "continue_story",
        correlation_id = %correlation_id.short(),
        node_count = input.node_count,
    );

    async move {
        tracing::info!(
            story_chars = input.story_so_far.len(),
            has_choice = !input.choice.is_empty(),
            "Continuing story"
        );

        match app.use_cases.story.continue_story.execute(input).await {
            Ok(output) => {
                tracing::info!(
                    node_count = output.node_count,
                    is_conclusion = output.is_conclusion,
                    "Story continued"
                );
                Ok(Json(output))
            }
            Err(e) => {
                tracing::error!(error = %e, "Story continuation failed");
                Err(ApiError::from(e))
            }
        }
    }
    .instrument(span)
    .await
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal(error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
            }
        }
    }
}

impl From<ContinueStoryError> for ApiError {
    fn from(e: ContinueStoryError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

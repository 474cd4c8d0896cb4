//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tracing::error;

use crate::pipeline::{FailureKind, PipelineError};
use crate::present::render_board;

use super::state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Create the application router.
///
/// The arrivals route lives at the configured path.
pub fn create_router(state: AppState) -> Router {
    let arrivals_path = state.pipeline.config().arrivals_path.clone();

    Router::new()
        .route("/health", get(health))
        .route(&arrivals_path, get(arrivals))
        .with_state(state)
}

/// Health check endpoint; independent of the upstream feed.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Next arrivals as one plain-text line. Always 200.
///
/// The run happens on its own task so that a panic inside it surfaces as a
/// [`PipelineError::Unexpected`] here instead of tearing down the connection.
async fn arrivals(State(state): State<AppState>) -> impl IntoResponse {
    let pipeline = Arc::clone(&state.pipeline);
    let outcome = match tokio::spawn(async move { pipeline.arrivals().await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(PipelineError::Unexpected(e.to_string())),
    };

    if let Err(e) = &outcome {
        if e.kind() == FailureKind::Unexpected {
            error!(error = %e, "Arrivals request failed");
        }
    }

    let body = render_board(&state.pipeline.config().label, &outcome);
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

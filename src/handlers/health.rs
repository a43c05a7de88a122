use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let summarizer = state.models.summarizer_state();
    let generator = state.models.generator_state();

    let response = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "extraction_strategy": state.config.extraction_strategy.as_str(),
        "models": {
            "summarizer": summarizer,
            "generator": generator
        }
    });

    info!(summarizer = ?summarizer, generator = ?generator, "Health check completed");

    Json(response)
}

/// Readiness check endpoint. Models load on first use, so the service is
/// ready as soon as it is listening.
pub async fn ready_handler() -> StatusCode {
    StatusCode::OK
}

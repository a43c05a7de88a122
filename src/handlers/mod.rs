pub mod analyze;
pub mod cover_letter;
pub mod health;
pub mod resume;
pub mod upload;

pub use analyze::*;
pub use cover_letter::*;
pub use health::*;
pub use resume::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Room for the job description and multipart framing on top of the file limit.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_file_size_bytes() + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/api/v1/analyze", post(analyze_handler))
        .route("/api/v1/cover-letter", post(cover_letter_handler))
        .route("/api/v1/cover-letter/download", post(cover_letter_download_handler))
        .route("/api/v1/resume/render", post(render_resume_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

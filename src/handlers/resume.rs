use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::info;

use crate::error::AppResult;
use crate::handlers::upload::read_upload_form;
use crate::state::AppState;

pub const RENDERED_RESUME_FILE_NAME: &str = "updated_resume.pdf";

/// Reflows an uploaded résumé into a fresh PDF download.
pub async fn render_resume_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting resume render request");

    let mut form = read_upload_form(&mut multipart, state.config.max_file_size_mb).await?;
    let resume = form.require_resume()?;
    let text = state.analyzer.load_resume(resume).await?;

    let renderer = state.renderer;
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&text)).await??;

    info!(
        request_id = %request_id,
        pages = rendered.pages,
        paragraphs = rendered.paragraphs,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Resume render request completed"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", RENDERED_RESUME_FILE_NAME),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}

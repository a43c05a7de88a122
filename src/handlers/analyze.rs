use axum::{
    extract::{Multipart, State},
    response::Json,
};
use std::time::Instant;
use tracing::{error, info};

use crate::error::AppResult;
use crate::handlers::upload::read_upload_form;
use crate::models::AnalyzeResponse;
use crate::state::AppState;

/// Compares an uploaded résumé against a job description.
pub async fn analyze_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting analysis request");

    let mut form = read_upload_form(&mut multipart, state.config.max_file_size_mb).await?;
    let job_description = form.require_job_description()?;
    let resume = form.require_resume()?;

    info!(
        request_id = %request_id,
        file_name = %resume.name,
        file_size = resume.size,
        job_characters = job_description.chars().count(),
        "Analysis inputs received"
    );

    let report = match state.analyzer.analyze(&job_description, resume).await {
        Ok(report) => report,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Analysis failed");
            return Err(e);
        }
    };

    let total_time = start.elapsed().as_millis() as u64;
    let response = AnalyzeResponse::new(report, total_time);

    info!(
        request_id = %request_id,
        matched = response.data.counts.matched,
        missing = response.data.counts.missing,
        total_time_ms = total_time,
        "Analysis request completed"
    );

    Ok(Json(response))
}

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use std::time::Instant;
use tracing::{error, info};

use crate::error::AppResult;
use crate::models::{CoverLetterDraft, CoverLetterRequest, CoverLetterResponse, Summary};
use crate::state::AppState;

pub const COVER_LETTER_FILE_NAME: &str = "cover_letter.txt";

async fn compose(
    state: &AppState,
    payload: Result<Json<CoverLetterRequest>, JsonRejection>,
) -> AppResult<CoverLetterDraft> {
    let Json(request) = payload?;
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, tone = %request.tone, "Starting cover letter request");

    let job_summary = Summary::new(request.job_summary);
    let resume_summary = Summary::new(request.resume_summary);

    match state
        .composer
        .compose_named(&job_summary, &resume_summary, &request.tone)
        .await
    {
        Ok(draft) => Ok(draft),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Cover letter request failed");
            Err(e.into())
        }
    }
}

pub async fn cover_letter_handler(
    State(state): State<AppState>,
    payload: Result<Json<CoverLetterRequest>, JsonRejection>,
) -> AppResult<Json<CoverLetterResponse>> {
    let start = Instant::now();
    let draft = compose(&state, payload).await?;
    Ok(Json(CoverLetterResponse::new(draft, start.elapsed().as_millis() as u64)))
}

/// Same as [`cover_letter_handler`] but returns the formatted letter as a text attachment.
pub async fn cover_letter_download_handler(
    State(state): State<AppState>,
    payload: Result<Json<CoverLetterRequest>, JsonRejection>,
) -> AppResult<Response> {
    let draft = compose(&state, payload).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", COVER_LETTER_FILE_NAME),
            ),
        ],
        draft.formatted_letter,
    )
        .into_response())
}

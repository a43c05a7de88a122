use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::RawDocument;

pub const JOB_DESCRIPTION_FIELD: &str = "job_description";
pub const RESUME_FIELD: &str = "resume";

/// Fields of an analysis or render form; either may be absent.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub job_description: Option<String>,
    pub resume: Option<RawDocument>,
}

impl UploadForm {
    pub fn require_resume(&mut self) -> AppResult<RawDocument> {
        self.resume
            .take()
            .ok_or_else(|| AppError::missing_field(RESUME_FIELD))
    }

    pub fn require_job_description(&mut self) -> AppResult<String> {
        self.job_description
            .take()
            .ok_or_else(|| AppError::missing_field(JOB_DESCRIPTION_FIELD))
    }
}

/// Reads the known form fields, ignoring any others.
pub async fn read_upload_form(
    multipart: &mut Multipart,
    max_file_size_mb: usize,
) -> AppResult<UploadForm> {
    let max_bytes = max_file_size_mb * 1024 * 1024;
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size_mb))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            JOB_DESCRIPTION_FIELD => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_file_size_mb))?;
                debug!(characters = text.chars().count(), "Job description received");
                form.job_description = Some(text);
            }
            RESUME_FIELD => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let data = field.bytes().await.map_err(|e| multipart_error(e, max_file_size_mb))?;

                if data.is_empty() {
                    return Err(AppError::invalid_file("Uploaded resume is empty"));
                }
                if data.len() > max_bytes {
                    warn!(
                        file_size = data.len(),
                        max_size = max_bytes,
                        "Resume exceeds size limit"
                    );
                    return Err(AppError::FileTooLarge {
                        limit: max_file_size_mb,
                    });
                }

                let mut document = RawDocument::new(file_name, data.to_vec());
                if let Some(mime_type) = content_type {
                    document = document.with_mime_type(mime_type);
                }
                debug!(
                    file_name = %document.name,
                    file_size = document.size,
                    mime_type = ?document.mime_type,
                    "Resume received"
                );
                form.resume = Some(document);
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError, max_file_size_mb: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge {
            limit: max_file_size_mb,
        }
    } else {
        err.into()
    }
}

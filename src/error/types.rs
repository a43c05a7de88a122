use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::UnsupportedTone;
use crate::services::cover_letter::ComposeError;
use crate::services::document_loader::LoadError;
use crate::services::inference::InferenceError;
use crate::services::resume_renderer::RenderError;
use crate::services::summarizer::SummarizationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported file format: {message}")]
    UnsupportedFormat { message: String },

    #[error("Invalid file: {message}")]
    InvalidFile { message: String },

    #[error("Missing form field: {field}")]
    MissingField { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("File too large: exceeds limit of {limit}MB")]
    FileTooLarge { limit: usize },

    #[error("Document loading failed: {message}")]
    LoadFailed { message: String },

    #[error("Unsupported cover letter tone '{tone}' (expected friendly, professional or informal)")]
    UnsupportedTone { tone: String },

    #[error("Summarization failed: {message}")]
    SummarizationFailed { message: String },

    #[error("Cover letter generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Resume rendering failed: {message}")]
    RenderFailed { message: String },

    #[error("Request timeout: {message}")]
    Timeout { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            AppError::InvalidFile { .. } => "INVALID_FILE",
            AppError::MissingField { .. } => "MISSING_FIELD",
            AppError::ValidationError { .. } => "VALIDATION_ERROR",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::LoadFailed { .. } => "LOAD_FAILED",
            AppError::UnsupportedTone { .. } => "UNSUPPORTED_TONE",
            AppError::SummarizationFailed { .. } => "SUMMARIZATION_FAILED",
            AppError::GenerationFailed { .. } => "GENERATION_FAILED",
            AppError::RenderFailed { .. } => "RENDER_FAILED",
            AppError::Timeout { .. } => "REQUEST_TIMEOUT",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::InvalidFile { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingField { .. } => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::LoadFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedTone { .. } => StatusCode::BAD_REQUEST,
            AppError::SummarizationFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::RenderFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();
        let request_id = Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().to_rfc3339();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            request_id = %request_id,
            error_message = %message,
            "API error occurred"
        );

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
                "request_id": request_id,
                "timestamp": timestamp
            },
            "data": null
        }));

        (status, body).into_response()
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::UnsupportedFormat { .. } => AppError::UnsupportedFormat {
                message: err.to_string(),
            },
            LoadError::Pdf { .. } | LoadError::Docx { .. } => AppError::LoadFailed {
                message: err.to_string(),
            },
        }
    }
}

impl From<SummarizationError> for AppError {
    fn from(err: SummarizationError) -> Self {
        match err.source {
            InferenceError::Timeout { seconds } => AppError::Timeout {
                message: format!("summarization model did not answer within {}s", seconds),
            },
            source => AppError::SummarizationFailed {
                message: source.to_string(),
            },
        }
    }
}

impl From<ComposeError> for AppError {
    fn from(err: ComposeError) -> Self {
        match err {
            ComposeError::UnsupportedTone(tone) => tone.into(),
            ComposeError::GenerationFailed(InferenceError::Timeout { seconds }) => {
                AppError::Timeout {
                    message: format!("generation model did not answer within {}s", seconds),
                }
            }
            ComposeError::GenerationFailed(source) => AppError::GenerationFailed {
                message: source.to_string(),
            },
        }
    }
}

impl From<UnsupportedTone> for AppError {
    fn from(err: UnsupportedTone) -> Self {
        AppError::UnsupportedTone { tone: err.0 }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::RenderFailed {
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidFile {
            message: format!("Failed to read multipart form: {}", err),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::internal(format!("Background task failed: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError {
            message: message.into(),
        }
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        AppError::InvalidFile {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        AppError::MissingField { field: field.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}

//! API error handling
//!
//! Every error renders as `{"detail": "..."}`.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use studyai_core::StudyError;
use utoipa::ToSchema;

/// Detail returned for uploads that are not PDFs
pub const INVALID_FILE_TYPE: &str = "Invalid file type. Only PDF files are supported.";

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error detail
    #[schema(example = "Invalid file type. Only PDF files are supported.")]
    pub detail: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Extractor rejection carrying its own status
    Rejected(StatusCode, String),
    Internal(String),
}

impl AppError {
    pub fn invalid_file_type() -> Self {
        AppError::BadRequest(INVALID_FILE_TYPE.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Rejected(status, _) => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::BadRequest(msg) | AppError::Rejected(_, msg) | AppError::Internal(msg) => msg,
        };

        (status, Json(ApiError { detail })).into_response()
    }
}

impl From<StudyError> for AppError {
    fn from(err: StudyError) -> Self {
        match err {
            StudyError::InvalidInput(msg) => AppError::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "Request failed");
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejected(err.status(), err.body_text())
    }
}

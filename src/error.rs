use axum::{
    http::StatusCode,
    response::IntoResponse
};
use thiserror::Error;

use crate::{data::DataError, policy::UploadRejection, services::ServiceError, storage::StorageError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnSupportedMediaType(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Multipart error: {0}")]
    MultipartError(String),

    #[error(transparent)]
    DataError(#[from] DataError),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => AppError::NotFound(format!("File not found: {}", msg)),
            ServiceError::OperationFailed(msg) => {
                AppError::InternalServerError(format!("Error deleting file: {}", msg))
            }
            ServiceError::Data(err) => AppError::DataError(err),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage Error: {}", err);
        AppError::InternalServerError(format!("Internal server error: {}", err))
    }
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        match rejection {
            UploadRejection::AlreadyUploadedOnce(name) => {
                AppError::BadRequest(format!("File '{}' has already been uploaded once.", name))
            }
            UploadRejection::LimitReached(name) => {
                AppError::TooManyRequests(format!("Upload limit reached for '{}'.", name))
            }
        }
    }
}

/// Convert `AppError` into a plain-text HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Map application errors to HTTP status codes and messages
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::UnSupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            AppError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::MultipartError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DataError(DataError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg),
            AppError::DataError(DataError::Conflict(detail)) => {
                tracing::warn!("Conflict: {}", detail);
                (
                    StatusCode::BAD_REQUEST,
                    "Naming conflict with an existing file.".to_string(),
                )
            }
            AppError::DataError(err) => {
                tracing::error!("Database Error: {:}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error: database error".to_string(),
                )
            }
        };

        (status, error_message).into_response()
    }
}

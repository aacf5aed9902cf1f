//! Universal error handling for the API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::DbError;
use crate::images::ImageError;
use crate::jwt::JwtError;
use crate::media_storage::StorageError;

/// API error response envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code: code.into(),
                    message: message.into(),
                },
            },
        }
    }

    /// Create a 400 validation error carrying a field-level code
    #[must_use]
    pub fn validation(code: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            code,
            "Request validation failed",
            false,
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert storage errors to application errors
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::Unavailable(msg) => {
                tracing::error!("Object store unavailable: {msg}");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_unavailable",
                    "Object storage temporarily unavailable",
                    true,
                )
            }
            StorageError::DeleteFailed(msg) => {
                tracing::error!("Object delete failed: {msg}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "storage_delete_failed",
                    "Object storage delete failed",
                    true,
                )
            }
            StorageError::Config(msg) => {
                tracing::error!("Storage configuration error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    false,
                )
            }
        }
    }
}

/// Convert database errors to application errors
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "not_found",
                "Resource not found",
                false,
            ),
            DbError::UniqueViolation(msg) => {
                tracing::warn!("Unique constraint violation: {msg}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "already_registered",
                    "Resource already exists",
                    false,
                )
            }
            DbError::Connection(msg) | DbError::Migration(msg) | DbError::Query(msg) => {
                tracing::error!("Database error: {msg}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Internal server error",
                    true,
                )
            }
        }
    }
}

/// Convert JWT errors to application errors.
/// Issuance failures are server errors; validation failures map to a
/// uniform 401 in the auth middleware instead.
impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        tracing::error!("JWT error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            false,
        )
    }
}

/// Convert image service errors to application errors
impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::KeyOutsideNamespace => Self::new(
                StatusCode::FORBIDDEN,
                "invalid_storage_key",
                "Invalid storage key",
                false,
            ),
            ImageError::ObjectMissing => Self::new(
                StatusCode::BAD_REQUEST,
                "object_not_found",
                "File not found in storage. Upload may have failed.",
                false,
            ),
            ImageError::SizeMismatch { declared, actual } => Self::new(
                StatusCode::BAD_REQUEST,
                "size_mismatch",
                format!("Declared size {declared} does not match stored size {actual}"),
                false,
            ),
            ImageError::ContentTypeRejected(content_type) => Self::new(
                StatusCode::BAD_REQUEST,
                "content_type_rejected",
                format!("Stored content type {content_type} is not an allowed image type"),
                false,
            ),
            ImageError::NotFound => Self::new(
                StatusCode::NOT_FOUND,
                "not_found",
                "Image not found",
                false,
            ),
            ImageError::Storage(err) => err.into(),
            ImageError::Db(err) => err.into(),
        }
    }
}

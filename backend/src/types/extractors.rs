//! Custom extractors for request validation

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use validator::Validate;

use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                    false,
                ),
                _ => AppError::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_json",
                    "Invalid JSON payload",
                    false,
                ),
            })?;

        // Then validate
        payload.validate().map_err(reject_first_field_error)?;

        Ok(Self(payload))
    }
}

/// Custom query-string extractor that validates the parameters
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    "invalid_query",
                    "Invalid query parameters",
                    false,
                )
            })?;

        params.validate().map_err(reject_first_field_error)?;

        Ok(Self(params))
    }
}

/// Map the first field error's message to the response error code
fn reject_first_field_error(errors: validator::ValidationErrors) -> AppError {
    for (_field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            if let Some(message) = &error.message {
                return AppError::validation(message.as_ref());
            }
        }
    }
    AppError::validation("validation_error")
}

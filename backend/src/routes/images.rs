//! Image upload protocol handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::db::Image;
use crate::images::UploadConfirmation;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::types::{
    extractors::{ValidatedJson, ValidatedQuery},
    AppError,
};

static CONTENT_TYPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^image/(jpeg|png|gif|webp)$").expect("Invalid regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct UploadUrlRequest {
    /// Original filename, display-only
    #[validate(length(min = 1, max = 255, message = "invalid_filename"))]
    pub filename: String,
    /// MIME type (image/jpeg, image/png, image/gif, image/webp)
    #[validate(regex(path = *CONTENT_TYPE_REGEX, message = "unsupported_content_type"))]
    pub content_type: String,
    /// File size in bytes - max 10 MiB
    #[validate(range(min = 1, max = 10_485_760, message = "payload_too_large"))]
    pub size_bytes: i64,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    /// Presigned URL for one PUT upload
    pub upload_url: String,
    /// Key the object must be uploaded under
    pub storage_key: String,
    /// URL the object will be served from after confirmation
    pub public_url: String,
    /// ISO-8601 UTC timestamp when the presigned URL expires
    pub expires_at: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmRequest {
    /// Key returned by the upload-url endpoint
    #[validate(length(min = 1, max = 500, message = "invalid_storage_key"))]
    pub storage_key: String,
    #[validate(length(min = 1, max = 255, message = "invalid_filename"))]
    pub filename: String,
    #[validate(regex(path = *CONTENT_TYPE_REGEX, message = "unsupported_content_type"))]
    pub content_type: String,
    #[validate(range(min = 1, max = 10_485_760, message = "payload_too_large"))]
    pub size_bytes: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: i64,
    pub filename: String,
    pub public_url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            filename: image.filename,
            public_url: image.public_url,
            content_type: image.content_type,
            size_bytes: image.size_bytes,
            created_at: image.created_at,
        }
    }
}

const fn default_page() -> i64 {
    1
}

const fn default_per_page() -> i64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "invalid_page"))]
    pub page: i64,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100, message = "invalid_per_page"))]
    pub per_page: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<ImageResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Issues a presigned upload URL for a freshly allocated storage key.
/// Size and content type are validated against policy before any
/// authorization is issued; nothing is persisted here.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_upload_url(
    State(state): State<AppState>,
    AuthenticatedUser { user }: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let slot = state
        .images
        .issue_upload_slot(user.id, &payload.filename, &payload.content_type)
        .await?;

    Ok(Json(UploadUrlResponse {
        upload_url: slot.upload_url,
        storage_key: slot.storage_key,
        public_url: slot.public_url,
        expires_at: slot.expires_at.to_rfc3339(),
    }))
}

/// Confirms a completed upload, verifying the object against the store
/// before the metadata row is written. Safe to retry: a duplicate
/// confirmation returns the already-persisted image.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn confirm_upload(
    State(state): State<AppState>,
    AuthenticatedUser { user }: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<ConfirmRequest>,
) -> Result<(StatusCode, Json<ImageResponse>), AppError> {
    let image = state
        .images
        .confirm_upload(
            user.id,
            UploadConfirmation {
                storage_key: payload.storage_key,
                filename: payload.filename,
                content_type: payload.content_type,
                size_bytes: payload.size_bytes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ImageResponse::from(image))))
}

/// Lists the caller's images, newest first, with the total count
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_images(
    State(state): State<AppState>,
    AuthenticatedUser { user }: AuthenticatedUser,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<ImageListResponse>, AppError> {
    let page = state
        .images
        .list_images(user.id, query.page, query.per_page)
        .await?;

    Ok(Json(ImageListResponse {
        images: page.images.into_iter().map(ImageResponse::from).collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// Fetches a single image owned by the caller
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_image(
    State(state): State<AppState>,
    AuthenticatedUser { user }: AuthenticatedUser,
    Path(image_id): Path<i64>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = state.images.get_image(user.id, image_id).await?;

    Ok(Json(ImageResponse::from(image)))
}

/// Deletes an image: object store first, metadata row second
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_image(
    State(state): State<AppState>,
    AuthenticatedUser { user }: AuthenticatedUser,
    Path(image_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.images.delete_image(user.id, image_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

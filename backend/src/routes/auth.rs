//! Registration, login and current-user handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::db::User;
use crate::middleware::auth::AuthenticatedUser;
use crate::password;
use crate::state::AppState;
use crate::types::{extractors::ValidatedJson, AppError};

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Letters, digits, underscore and hyphen only
    #[validate(
        length(min = 3, max = 50, message = "invalid_username"),
        regex(path = *USERNAME_REGEX, message = "invalid_username")
    )]
    pub username: String,
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "invalid_password"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, message = "invalid_credentials"))]
    pub username: String,
    #[validate(length(min = 1, message = "invalid_credentials"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Registers a new user and issues their first bearer token
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    if let Some(existing) = state
        .db
        .find_registration_conflict(&payload.username, &payload.email)
        .await?
    {
        let (code, message) = if existing.username == payload.username {
            ("username_taken", "Username already registered")
        } else {
            ("email_taken", "Email already registered")
        };
        return Err(AppError::new(StatusCode::BAD_REQUEST, code, message, false));
    }

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
            false,
        )
    })?;

    // A registration racing past the pre-check still hits the unique
    // constraints and surfaces as a 400
    let user = state
        .db
        .create_user(&payload.username, &payload.email, &password_hash)
        .await?;

    info!(user_id = user.id, "User registered");

    let access_token = state.jwt_manager.issue_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse::bearer(access_token)),
    ))
}

/// Logs in with username or email, returning a bearer token.
/// Unknown identity and wrong password are indistinguishable.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state.db.get_user_by_identifier(&payload.username).await?;

    let verified = user.as_ref().is_some_and(|user| {
        password::verify_password(&payload.password, &user.password_hash).unwrap_or(false)
    });

    let Some(user) = user.filter(|_| verified) else {
        return Err(AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Incorrect username or password",
            false,
        ));
    };

    let access_token = state.jwt_manager.issue_token(user.id)?;

    Ok(Json(TokenResponse::bearer(access_token)))
}

/// Returns the authenticated user's profile
#[instrument(skip_all)]
pub async fn me(AuthenticatedUser { user }: AuthenticatedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

//! JWT bearer authentication middleware

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::db::User;
use crate::state::AppState;
use crate::types::AppError;

/// Authenticated user loaded from the validated token's subject
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The user row the token is bound to
    pub user: User,
}

/// Axum extractor for the authenticated user.
///
/// Use this in handlers behind `auth_middleware`:
/// ```ignore
/// async fn protected_handler(
///     AuthenticatedUser { user }: AuthenticatedUser,
/// ) -> Result<impl IntoResponse, AppError> {
///     // user.id scopes every query
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required but user not found in request extensions",
                false,
            )
        })
    }
}

/// JWT authentication middleware.
///
/// Extracts the Bearer token, validates it, loads the bound user and adds
/// `AuthenticatedUser` to the request extensions. Every failure mode
/// (missing header, expired, tampered, unknown subject) collapses to a
/// uniform 401; the specific reason stays in the logs.
///
/// # Errors
///
/// Returns a 401 `AppError` for invalid or missing tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization header must contain a valid Bearer token",
                false,
            )
        })?;

    let claims = state.jwt_manager.validate(token).map_err(|_| {
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token",
            false,
        )
    })?;

    let user = match claims.user_id() {
        Some(user_id) => state.db.get_user(user_id).await?,
        None => None,
    }
    .ok_or_else(|| {
        tracing::debug!("Token subject does not resolve to a user");
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token",
            false,
        )
    })?;

    request.extensions_mut().insert(AuthenticatedUser { user });

    Ok(next.run(request).await)
}

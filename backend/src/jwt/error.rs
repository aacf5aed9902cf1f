//! JWT-related error types

use thiserror::Error;

/// Errors that can occur during JWT operations
#[derive(Error, Debug)]
pub enum JwtError {
    /// JWT encoding failed
    #[error("Failed to encode JWT token")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    /// JWT validation failed. Expired, tampered and wrongly-signed tokens
    /// all collapse here; the specific reason is logged, never returned.
    #[error("Invalid or expired token")]
    ValidationError,
}

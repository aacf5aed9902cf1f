//! Plain value structs mapped from database rows

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// User account for authentication and image ownership
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Surrogate id
    pub id: i64,
    /// Unique username
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Argon2id PHC hash, never exposed in responses
    pub password_hash: String,
    /// Set once at registration
    pub created_at: DateTime<Utc>,
}

/// Image metadata row. The actual bytes live in the object store,
/// joined via `storage_key`.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    /// Surrogate id
    pub id: i64,
    /// Owning user, immutable after creation
    pub user_id: i64,
    /// Original client-supplied name, display-only
    pub filename: String,
    /// Unique object-store key, `{user_id}/{token}.{ext}`
    pub storage_key: String,
    /// Verified MIME type
    pub content_type: String,
    /// Verified object size
    pub size_bytes: i64,
    /// Derived public URL
    pub public_url: String,
    /// Set at confirmation time
    pub created_at: DateTime<Utc>,
}

/// Fields for a new image row, carrying store-verified values
#[derive(Debug, Clone)]
pub struct NewImage {
    /// Owning user
    pub user_id: i64,
    /// Original client-supplied name
    pub filename: String,
    /// Verified storage key
    pub storage_key: String,
    /// Store-reported MIME type
    pub content_type: String,
    /// Store-reported size
    pub size_bytes: i64,
    /// Derived public URL
    pub public_url: String,
}

//! Error types for object storage operations

use thiserror::Error;

/// Result type for object storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during object storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Store unreachable or failing; retryable
    #[error("Object store unavailable: {0}")]
    Unavailable(String),

    /// Delete did not complete; no partial state was applied
    #[error("Object delete failed: {0}")]
    DeleteFailed(String),

    /// Presigning configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

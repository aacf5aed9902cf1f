//! Object storage operations: presigned upload URLs, authoritative
//! existence checks and deletes.

mod error;
pub mod key;
#[cfg(feature = "test-utils")]
mod memory;
mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::{StorageError, StorageResult};
#[cfg(feature = "test-utils")]
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

/// MIME types accepted for upload
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upper bound on object size: 10 MiB
pub const MAX_IMAGE_SIZE_BYTES: i64 = 10 * 1024 * 1024;

/// Whether a MIME type is on the upload allow-list
#[must_use]
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// The presigned URL for a single PUT to one key
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Authoritative object metadata reported by the store
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    /// Object size in bytes
    pub size_bytes: i64,
    /// Object MIME type
    pub content_type: String,
}

/// Derives public URLs for stored objects
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    public_base_url: String,
}

impl UploadPolicy {
    /// Creates a policy serving objects under the given base URL
    #[must_use]
    pub fn new(public_base_url: impl Into<String>) -> Self {
        let base: String = public_base_url.into();
        Self {
            public_base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Deterministic public URL for a storage key
    #[must_use]
    pub fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{storage_key}", self.public_base_url)
    }
}

/// The storage collaborator surface the upload protocol requires:
/// presigned writes, metadata-only existence checks, and deletes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Generates a presigned URL permitting one PUT of the given content
    /// type to exactly this key, valid until the configured expiry.
    /// Must not create the key or write any data itself.
    async fn presign_put(&self, key: &str, content_type: &str) -> StorageResult<PresignedUpload>;

    /// Authoritative existence and metadata check (no data read).
    /// Returns `Ok(None)` when the object does not exist.
    async fn head_object(&self, key: &str) -> StorageResult<Option<ObjectInfo>>;

    /// Deletes an object. Deleting an absent object is success: the goal
    /// state already holds.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;
}

//! Upload slot issuance, upload confirmation and deletion.
//!
//! Everything here maintains one invariant: an image row exists only for
//! a storage key whose object was verified against the store immediately
//! before the insert, and deletion never removes a row while its object
//! still exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{Database, DbError, Image, NewImage};
use crate::media_storage::{
    is_allowed_content_type, key::allocate_key, ObjectStore, StorageError, UploadPolicy,
};

/// Errors surfaced by the image service
#[derive(Error, Debug)]
pub enum ImageError {
    /// Storage key is not under the caller's namespace
    #[error("Storage key outside caller namespace")]
    KeyOutsideNamespace,

    /// No object exists at the storage key; the upload must be retried
    #[error("No object found at storage key")]
    ObjectMissing,

    /// Client-declared size disagrees with the store-reported size
    #[error("Declared size {declared} does not match stored size {actual}")]
    SizeMismatch {
        /// Size the client declared
        declared: i64,
        /// Size the store reported
        actual: i64,
    },

    /// Store-reported content type is not on the allow-list
    #[error("Content type not allowed: {0}")]
    ContentTypeRejected(String),

    /// Image absent or owned by someone else; indistinguishable by design
    #[error("Image not found")]
    NotFound,

    /// Object store failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Database failure
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Authorization artifact for one upload attempt
#[derive(Debug, Clone)]
pub struct UploadSlot {
    /// Presigned URL permitting one PUT to the storage key
    pub upload_url: String,
    /// Freshly allocated storage key
    pub storage_key: String,
    /// URL the object will be served from once uploaded
    pub public_url: String,
    /// When the presigned URL expires
    pub expires_at: DateTime<Utc>,
}

/// Client-asserted upload metadata to be verified against the store
#[derive(Debug, Clone)]
pub struct UploadConfirmation {
    /// Key returned by slot issuance
    pub storage_key: String,
    /// Original filename, display-only
    pub filename: String,
    /// Declared MIME type
    pub content_type: String,
    /// Declared size in bytes
    pub size_bytes: i64,
}

/// One page of a user's images
#[derive(Debug, Clone)]
pub struct ImagePage {
    /// Images on this page, newest first
    pub images: Vec<Image>,
    /// Total image count for the user
    pub total: i64,
    /// Requested page number
    pub page: i64,
    /// Requested page size
    pub per_page: i64,
}

/// Coordinates the object store and the database for the upload protocol
#[derive(Clone)]
pub struct ImageService {
    db: Database,
    store: Arc<dyn ObjectStore>,
    policy: UploadPolicy,
}

impl ImageService {
    /// Creates a new image service
    #[must_use]
    pub fn new(db: Database, store: Arc<dyn ObjectStore>, policy: UploadPolicy) -> Self {
        Self { db, store, policy }
    }

    /// Allocates a fresh storage key and issues a presigned upload URL
    /// for it. No state is persisted; a row appears only at confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Storage` when presigning fails; nothing was
    /// created in that case.
    pub async fn issue_upload_slot(
        &self,
        user_id: i64,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadSlot, ImageError> {
        let storage_key = allocate_key(user_id, filename);
        let presigned = self.store.presign_put(&storage_key, content_type).await?;
        let public_url = self.policy.public_url(&storage_key);

        debug!(user_id, %storage_key, "Issued upload slot");

        Ok(UploadSlot {
            upload_url: presigned.url,
            storage_key,
            public_url,
            expires_at: presigned.expires_at,
        })
    }

    /// Verifies a claimed upload against the store, then persists the
    /// image row using the store-verified values.
    ///
    /// Verification strictly precedes the insert. A duplicate
    /// confirmation resolves idempotently to the already-persisted row.
    ///
    /// # Errors
    ///
    /// `KeyOutsideNamespace` when the key is not the caller's,
    /// `ObjectMissing` when no object exists at the key, `SizeMismatch` /
    /// `ContentTypeRejected` when store state disagrees with the claim or
    /// policy, `Storage` / `Db` on collaborator failures.
    pub async fn confirm_upload(
        &self,
        user_id: i64,
        confirmation: UploadConfirmation,
    ) -> Result<Image, ImageError> {
        // Namespace check before touching any collaborator
        if !confirmation
            .storage_key
            .starts_with(&format!("{user_id}/"))
        {
            return Err(ImageError::KeyOutsideNamespace);
        }

        // Authoritative existence + metadata check; the client's claim is
        // never trusted for the invariant
        let object = self
            .store
            .head_object(&confirmation.storage_key)
            .await?
            .ok_or(ImageError::ObjectMissing)?;

        if object.size_bytes != confirmation.size_bytes {
            return Err(ImageError::SizeMismatch {
                declared: confirmation.size_bytes,
                actual: object.size_bytes,
            });
        }

        if !is_allowed_content_type(&object.content_type) {
            return Err(ImageError::ContentTypeRejected(object.content_type));
        }

        let public_url = self.policy.public_url(&confirmation.storage_key);
        let new = NewImage {
            user_id,
            filename: confirmation.filename,
            storage_key: confirmation.storage_key,
            content_type: object.content_type,
            size_bytes: object.size_bytes,
            public_url,
        };

        match self.db.insert_image(&new).await {
            Ok(image) => {
                info!(user_id, image_id = image.id, "Upload confirmed");
                Ok(image)
            }
            // Racing or repeated confirmations land here; the unique
            // constraint on storage_key guarantees a single row
            Err(DbError::UniqueViolation(_)) => {
                let existing = self.db.get_image_by_storage_key(&new.storage_key).await?;
                match existing {
                    Some(image) if image.user_id == user_id => {
                        info!(user_id, image_id = image.id, "Duplicate confirmation resolved");
                        Ok(image)
                    }
                    _ => Err(ImageError::Db(DbError::Query(
                        "confirmation raced with a concurrent delete".to_string(),
                    ))),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches one image, owner-scoped
    ///
    /// # Errors
    ///
    /// `NotFound` covers both absent and foreign-owned images
    pub async fn get_image(&self, user_id: i64, image_id: i64) -> Result<Image, ImageError> {
        self.db
            .get_image_owned(image_id, user_id)
            .await?
            .ok_or(ImageError::NotFound)
    }

    /// Lists one page of the caller's images with the total count
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Db` on query failure
    pub async fn list_images(
        &self,
        user_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<ImagePage, ImageError> {
        let offset = (page - 1) * per_page;

        let total = self.db.count_images(user_id).await?;
        let images = self.db.list_images(user_id, per_page, offset).await?;

        Ok(ImagePage {
            images,
            total,
            page,
            per_page,
        })
    }

    /// Deletes the object first, the row second, or neither.
    ///
    /// A store failure leaves the row intact: a dangling row is
    /// user-visible, an orphaned object is merely reclaimable waste.
    ///
    /// # Errors
    ///
    /// `NotFound` for absent or foreign-owned images, `Storage` when the
    /// object delete fails (row untouched), `Db` on row delete failure.
    pub async fn delete_image(&self, user_id: i64, image_id: i64) -> Result<(), ImageError> {
        let image = self
            .db
            .get_image_owned(image_id, user_id)
            .await?
            .ok_or(ImageError::NotFound)?;

        // Object first. An already-absent object counts as success.
        self.store.delete_object(&image.storage_key).await?;

        self.db.delete_image_row(image.id).await?;

        info!(user_id, image_id, storage_key = %image.storage_key, "Image deleted");
        Ok(())
    }
}

//! S3-backed object store

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::SdkError, operation::head_object::HeadObjectError, presigning::PresigningConfig,
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ObjectInfo, ObjectStore, PresignedUpload, StorageError, StorageResult};

/// Object store client backed by an S3-compatible service
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    presigned_url_expiry_secs: u64,
}

impl S3ObjectStore {
    /// Creates a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket holding uploaded images
    /// * `presigned_url_expiry_secs` - Expiry for presigned upload URLs
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            presigned_url_expiry_secs,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, key: &str, content_type: &str) -> StorageResult<PresignedUpload> {
        let presigned_config =
            PresigningConfig::expires_in(Duration::from_secs(self.presigned_url_expiry_secs))
                .map_err(|e| {
                    StorageError::Config(format!("Failed to create presigning config: {e}"))
                })?;

        let presigned_url = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigned_config)
            .await
            .map_err(|e| {
                StorageError::Unavailable(format!("Failed to generate presigned URL: {e}"))
            })?;

        let expires_at: DateTime<Utc> =
            Utc::now() + Duration::from_secs(self.presigned_url_expiry_secs);

        Ok(PresignedUpload {
            url: presigned_url.uri().to_string(),
            expires_at,
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                debug!("Object exists: {key}");
                Ok(Some(ObjectInfo {
                    size_bytes: output.content_length().unwrap_or_default(),
                    content_type: output
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string(),
                }))
            }
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                debug!("Object does not exist: {key}");
                Ok(None)
            }
            Err(e) => Err(StorageError::Unavailable(format!(
                "Failed to check object existence for {key}: {e}"
            ))),
        }
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        // S3 reports success for deletes of absent keys, which matches
        // the protocol: the goal state (object gone) already holds.
        self.s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("Failed to delete {key}: {e}")))?;

        debug!("Object deleted: {key}");
        Ok(())
    }
}

//! In-memory object store for tests (`test-utils` feature)

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{ObjectInfo, ObjectStore, PresignedUpload, StorageError, StorageResult};

/// In-memory [`ObjectStore`] with fault injection, standing in for S3 so
/// the test suite runs without external services.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, ObjectInfo>>,
    fail_head: AtomicBool,
    fail_delete: AtomicBool,
}

impl InMemoryObjectStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a completed client upload by placing object metadata at
    /// the given key.
    pub fn put_object(&self, key: &str, size_bytes: i64, content_type: &str) {
        self.objects.lock().expect("store poisoned").insert(
            key.to_string(),
            ObjectInfo {
                size_bytes,
                content_type: content_type.to_string(),
            },
        );
    }

    /// Whether an object currently exists at the key
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().expect("store poisoned").contains_key(key)
    }

    /// Makes subsequent existence checks fail as unavailable
    pub fn fail_head(&self, fail: bool) {
        self.fail_head.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent deletes fail
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn presign_put(&self, key: &str, content_type: &str) -> StorageResult<PresignedUpload> {
        // Shaped like a real presigned URL; never dereferenced in tests
        Ok(PresignedUpload {
            url: format!(
                "https://uploads.test.invalid/{key}?X-Amz-Expires=3600&Content-Type={content_type}"
            ),
            expires_at: Utc::now() + Duration::from_secs(3600),
        })
    }

    async fn head_object(&self, key: &str) -> StorageResult<Option<ObjectInfo>> {
        if self.fail_head.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "injected head_object failure".to_string(),
            ));
        }

        Ok(self.objects.lock().expect("store poisoned").get(key).cloned())
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "injected delete_object failure".to_string(),
            ));
        }

        // Removing an absent key is success: the goal state already holds
        self.objects.lock().expect("store poisoned").remove(key);
        Ok(())
    }
}

//! In-process backend used by tests and by deployments without an object
//! store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::bucket::Bucket;
use crate::error::StorageError;
use crate::store::ObjectStore;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Object store kept in a map. Writes can be forced to fail to exercise
/// rollback paths.
#[derive(Default)]
pub struct MemoryStorage {
    objects: RwLock<HashMap<(Bucket, String), StoredObject>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, bucket: Bucket, key: &str) -> bool {
        self.objects
            .read()
            .await
            .contains_key(&(bucket, key.to_string()))
    }

    pub async fn content_type(&self, bucket: Bucket, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(&(bucket, key.to_string()))
            .map(|o| o.content_type.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStorage {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("writes disabled".into()));
        }
        self.objects.write().await.insert(
            (bucket, key.to_string()),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(&(bucket, key.to_string()))
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound {
                bucket: format!("{bucket:?}").to_lowercase(),
                key: key.to_string(),
            })
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .await
            .remove(&(bucket, key.to_string()));
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: Bucket,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let bucket_name = format!("{bucket:?}").to_lowercase();
        Ok(format!(
            "memory://{bucket_name}/{key}?expires={}",
            expires_in.as_secs()
        ))
    }

    async fn ensure_bucket(&self, _bucket: Bucket) -> Result<(), StorageError> {
        Ok(())
    }
}

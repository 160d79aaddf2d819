use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::bucket::Bucket;
use crate::error::StorageError;

/// Object storage operations used by the API and the worker.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Fetch the whole object.
    async fn get(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove an object. Removing a missing object is not an error.
    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StorageError>;

    /// Time-limited download URL for an object.
    async fn presign_get(
        &self,
        bucket: Bucket,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Create the bucket if it does not exist yet.
    async fn ensure_bucket(&self, bucket: Bucket) -> Result<(), StorageError>;
}

/// Shared handle to the configured backend.
pub type SharedStore = Arc<dyn ObjectStore>;

/// MIME type for a file extension, `application/octet-stream` if unknown.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "json" => "application/json",
        "onnx" => "application/onnx",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("JPG"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("pt"), "application/octet-stream");
    }
}

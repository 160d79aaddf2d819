//! S3-compatible backend (MinIO in development).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::bucket::{Bucket, BucketNames};
use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::store::ObjectStore;

/// Object store backed by `aws-sdk-s3` with path-style addressing.
pub struct S3Storage {
    client: Client,
    buckets: BucketNames,
}

impl S3Storage {
    pub async fn connect(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "labelforge-static",
        );
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::info!(endpoint = %config.endpoint_url(), "S3 storage client configured");
        Self {
            client: Client::from_conf(s3_config),
            buckets: config.buckets.clone(),
        }
    }
}

fn backend_error<E: std::error::Error>(op: &str, err: E) -> StorageError {
    StorageError::Backend(format!("{op}: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let name = self.buckets.name(bucket);
        let size = data.len();
        self.client
            .put_object()
            .bucket(name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| backend_error("put_object", e))?;
        tracing::debug!(bucket = name, key, size, "Object stored");
        Ok(())
    }

    async fn get(&self, bucket: Bucket, key: &str) -> Result<Vec<u8>, StorageError> {
        let name = self.buckets.name(bucket);
        let output = self
            .client
            .get_object()
            .bucket(name)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound {
                        bucket: name.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    backend_error("get_object", e)
                }
            })?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| backend_error("get_object body", e))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> Result<(), StorageError> {
        let name = self.buckets.name(bucket);
        self.client
            .delete_object()
            .bucket(name)
            .key(key)
            .send()
            .await
            .map_err(|e| backend_error("delete_object", e))?;
        tracing::debug!(bucket = name, key, "Object deleted");
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: Bucket,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| backend_error("presign", e))?;
        let request = self
            .client
            .get_object()
            .bucket(self.buckets.name(bucket))
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| backend_error("presign", e))?;
        Ok(request.uri().to_string())
    }

    async fn ensure_bucket(&self, bucket: Bucket) -> Result<(), StorageError> {
        let name = self.buckets.name(bucket);
        if self.client.head_bucket().bucket(name).send().await.is_ok() {
            return Ok(());
        }
        match self.client.create_bucket().bucket(name).send().await {
            Ok(_) => {
                tracing::info!(bucket = name, "Bucket created");
                Ok(())
            }
            Err(e)
                if e.as_service_error().is_some_and(|se| {
                    se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists()
                }) =>
            {
                Ok(())
            }
            Err(e) => Err(backend_error("create_bucket", e)),
        }
    }
}

use crate::bucket::BucketNames;

/// Connection settings for the S3-compatible object store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Host and port (`localhost:9000`) or a full URL.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Use HTTPS when `endpoint` carries no scheme.
    pub secure: bool,
    pub region: String,
    pub buckets: BucketNames,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var               | Default          |
    /// |-----------------------|------------------|
    /// | `MINIO_URL`           | `localhost:9000` |
    /// | `MINIO_ROOT_USER`     | `minioadmin`     |
    /// | `MINIO_ROOT_PASSWORD` | `minioadmin`     |
    /// | `MINIO_SECURE`        | `false`          |
    /// | `STORAGE_REGION`      | `us-east-1`      |
    /// | `IMAGES_BUCKET`       | `images`         |
    /// | `MODELS_BUCKET`       | `models`         |
    /// | `DATASETS_BUCKET`     | `datasets`       |
    /// | `TEMP_BUCKET`         | `temp`           |
    pub fn from_env() -> Self {
        let env = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.into());
        let secure = env("MINIO_SECURE", "false")
            .parse::<bool>()
            .expect("MINIO_SECURE must be true or false");

        Self {
            endpoint: env("MINIO_URL", "localhost:9000"),
            access_key: env("MINIO_ROOT_USER", "minioadmin"),
            secret_key: env("MINIO_ROOT_PASSWORD", "minioadmin"),
            secure,
            region: env("STORAGE_REGION", "us-east-1"),
            buckets: BucketNames {
                images: env("IMAGES_BUCKET", "images"),
                models: env("MODELS_BUCKET", "models"),
                datasets: env("DATASETS_BUCKET", "datasets"),
                temp: env("TEMP_BUCKET", "temp"),
            },
        }
    }

    /// Endpoint as a URL, adding the scheme implied by `secure` if missing.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.clone()
        } else if self.secure {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

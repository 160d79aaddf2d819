//! Object storage gateway.
//!
//! Artifacts live in one bucket per kind ([`Bucket`]); callers talk to the
//! [`ObjectStore`] trait and never see bucket names or the SDK. The S3
//! backend targets MinIO or any S3-compatible endpoint; the in-memory
//! backend serves tests and local runs without an object store.

pub mod bucket;
pub mod config;
pub mod error;
pub mod memory;
pub mod s3;
pub mod store;

pub use bucket::{Bucket, BucketNames};
pub use config::StorageConfig;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use s3::S3Storage;
pub use store::{content_type_for, ObjectStore, SharedStore};

//! Local staging of uploaded files.
//!
//! An upload is written to `UPLOAD_DIR` under a random name, inspected, then
//! pushed to object storage. The staged file is removed when the
//! [`StagedUpload`] is dropped, whichever way the request ends.

use std::path::{Path, PathBuf};

use labelforge_core::error::CoreError;

use crate::error::{AppError, AppResult};

/// Image formats accepted by the upload endpoint.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Lowercased extension of `filename`, validated against
/// [`SUPPORTED_IMAGE_EXTENSIONS`].
pub fn image_extension(filename: &str) -> AppResult<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// A file staged in the upload directory.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
}

impl StagedUpload {
    /// Write `data` to a fresh file under `dir`.
    pub async fn write(dir: &Path, ext: &str, data: &[u8]) -> AppResult<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::InternalError(format!("create upload dir: {e}")))?;
        let path = dir.join(format!("{}.{ext}", uuid::Uuid::new_v4()));
        let staged = Self { path };
        tokio::fs::write(&staged.path, data)
            .await
            .map_err(|e| AppError::InternalError(format!("stage upload: {e}")))?;
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel dimensions read from the image header.
    pub async fn dimensions(&self) -> AppResult<(u32, u32)> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || image::image_dimensions(&path))
            .await
            .map_err(|e| AppError::InternalError(format!("dimension task: {e}")))?
            .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")).into())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}

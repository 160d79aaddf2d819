//! Job kinds and export formats for the asynchronous job queue.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of work a queued job performs. Stored as text in
/// `job_outbox.job_kind` and `jobs.job_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Train,
    Detect,
    Export,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Train => "train",
            JobKind::Detect => "detect",
            JobKind::Export => "export",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "train" => Ok(JobKind::Train),
            "detect" => Ok(JobKind::Detect),
            "export" => Ok(JobKind::Export),
            other => Err(CoreError::Validation(format!("Unknown job kind '{other}'"))),
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a trained model can be exported to.
pub const EXPORT_FORMATS: &[&str] = &["onnx", "torchscript", "tflite", "coreml"];

/// Validate a model export format.
pub fn validate_export_format(format: &str) -> Result<(), CoreError> {
    if EXPORT_FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported export format '{format}'. Must be one of: {EXPORT_FORMATS:?}"
        )))
    }
}

/// Payload of an export job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub format: String,
}

//! Detection routine interface and the static detector.

use async_trait::async_trait;
use labelforge_core::detection::{filter_detections, DetectedObject};
use labelforge_core::types::DbId;

use crate::error::PipelineError;

/// Input of one detection run.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub detection_id: DbId,
    /// Key of the image in the images bucket.
    pub image_key: String,
    /// Key of the trained weights in the models bucket, if the model has
    /// been trained.
    pub model_key: Option<String>,
    pub confidence_threshold: f64,
    pub max_detections: usize,
}

/// Produces objects for an image, already filtered by
/// `confidence_threshold`, sorted by confidence and capped at
/// `max_detections`.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, request: &DetectionRequest)
        -> Result<Vec<DetectedObject>, PipelineError>;
}

/// Returns the same two objects for every image.
pub struct StaticDetector;

impl StaticDetector {
    fn fixed_objects() -> Vec<DetectedObject> {
        vec![
            DetectedObject {
                class_name: "person".into(),
                confidence: 0.95,
                x: 10.0,
                y: 20.0,
                width: 90.0,
                height: 180.0,
            },
            DetectedObject {
                class_name: "car".into(),
                confidence: 0.87,
                x: 150.0,
                y: 30.0,
                width: 100.0,
                height: 150.0,
            },
        ]
    }
}

#[async_trait]
impl Detector for StaticDetector {
    async fn detect(
        &self,
        request: &DetectionRequest,
    ) -> Result<Vec<DetectedObject>, PipelineError> {
        Ok(filter_detections(
            Self::fixed_objects(),
            request.confidence_threshold,
            request.max_detections,
        ))
    }
}

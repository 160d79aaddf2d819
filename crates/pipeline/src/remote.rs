//! Detector backed by an external HTTP detection service.
//!
//! The service receives the image (and the trained weights when the model
//! has them) as multipart form data on `POST {base_url}/detect` and answers
//! with corner-format boxes:
//!
//! ```json
//! {"detections": [{"x1": 10, "y1": 20, "x2": 100, "y2": 200, "score": 0.9, "label": "person"}]}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use labelforge_core::detection::{filter_detections, DetectedObject};
use labelforge_core::geometry::BoundingBox;
use labelforge_storage::{Bucket, SharedStore};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::detector::{DetectionRequest, Detector};
use crate::error::PipelineError;

/// Upper bound on one detector call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<RemoteBox>,
}

#[derive(Debug, Deserialize)]
struct RemoteBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    #[serde(alias = "confidence")]
    score: f64,
    #[serde(alias = "class_name")]
    label: String,
}

impl TryFrom<RemoteBox> for DetectedObject {
    type Error = PipelineError;

    fn try_from(b: RemoteBox) -> Result<Self, Self::Error> {
        if ![b.x1, b.y1, b.x2, b.y2, b.score].iter().all(|v| v.is_finite()) {
            return Err(PipelineError::Detector(format!(
                "invalid detector response: non-finite value in box for '{}'",
                b.label
            )));
        }
        if !(0.0..=1.0).contains(&b.score) {
            return Err(PipelineError::Detector(format!(
                "invalid detector response: score {} for '{}' is outside 0..=1",
                b.score, b.label
            )));
        }
        let bbox = BoundingBox::from_corners(b.x1, b.y1, b.x2, b.y2);
        Ok(DetectedObject {
            class_name: b.label,
            confidence: b.score,
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
        })
    }
}

pub struct RemoteDetector {
    client: reqwest::Client,
    base_url: String,
    store: SharedStore,
}

impl RemoteDetector {
    pub fn new(base_url: impl Into<String>, store: SharedStore) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            store,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/detect", self.base_url.trim_end_matches('/'))
    }

    async fn build_form(&self, request: &DetectionRequest) -> Result<Form, PipelineError> {
        let image = self.store.get(Bucket::Images, &request.image_key).await?;
        let mut form = Form::new()
            .part("image", Part::bytes(image).file_name(request.image_key.clone()))
            .text("confidence_threshold", request.confidence_threshold.to_string())
            .text("max_detections", request.max_detections.to_string());
        if let Some(model_key) = &request.model_key {
            let weights = self.store.get(Bucket::Models, model_key).await?;
            form = form.part("model", Part::bytes(weights).file_name(model_key.clone()));
        }
        Ok(form)
    }
}

#[async_trait]
impl Detector for RemoteDetector {
    async fn detect(
        &self,
        request: &DetectionRequest,
    ) -> Result<Vec<DetectedObject>, PipelineError> {
        let form = self.build_form(request).await?;
        let url = self.endpoint();
        tracing::debug!(detection_id = request.detection_id, url = %url, "Calling remote detector");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PipelineError::Detector(e.to_string()))?;
        let body: DetectResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Detector(format!("invalid detector response: {e}")))?;

        translate(body, request.confidence_threshold, request.max_detections)
    }
}

fn translate(
    body: DetectResponse,
    threshold: f64,
    max_detections: usize,
) -> Result<Vec<DetectedObject>, PipelineError> {
    let objects = body
        .detections
        .into_iter()
        .map(DetectedObject::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(filter_detections(objects, threshold, max_detections))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use labelforge_storage::MemoryStorage;

    use super::*;

    #[test]
    fn corner_boxes_become_origin_and_extent() {
        let body: DetectResponse = serde_json::from_value(serde_json::json!({
            "detections": [
                {"x1": 150, "y1": 30, "x2": 250, "y2": 180, "score": 0.87, "label": "car"},
                {"x1": 10, "y1": 20, "x2": 100, "y2": 200, "confidence": 0.95, "class_name": "person"},
                {"x1": 0, "y1": 0, "x2": 5, "y2": 5, "score": 0.2, "label": "noise"}
            ]
        }))
        .unwrap();

        let objects = translate(body, 0.5, 10).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].class_name, "person");
        assert_eq!(objects[0].width, 90.0);
        assert_eq!(objects[0].height, 180.0);
        assert_eq!(objects[1].x, 150.0);
    }

    #[test]
    fn percentage_scores_are_rejected() {
        let body: DetectResponse = serde_json::from_value(serde_json::json!({
            "detections": [
                {"x1": 0, "y1": 0, "x2": 10, "y2": 10, "score": 0.9, "label": "car"},
                {"x1": 0, "y1": 0, "x2": 10, "y2": 10, "score": 87.0, "label": "person"}
            ]
        }))
        .unwrap();
        let result = translate(body, 0.5, 10);
        assert_matches!(result, Err(PipelineError::Detector(msg)) if msg.contains("outside 0..=1"));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let body = DetectResponse {
            detections: vec![RemoteBox {
                x1: 0.0,
                y1: f64::NAN,
                x2: 10.0,
                y2: f64::INFINITY,
                score: 0.9,
                label: "car".into(),
            }],
        };
        let result = translate(body, 0.0, 10);
        assert_matches!(result, Err(PipelineError::Detector(msg)) if msg.starts_with("invalid detector response"));
    }

    #[test]
    fn translation_caps_result_count() {
        let body: DetectResponse = serde_json::from_value(serde_json::json!({
            "detections": [
                {"x1": 0, "y1": 0, "x2": 1, "y2": 1, "score": 0.6, "label": "a"},
                {"x1": 0, "y1": 0, "x2": 1, "y2": 1, "score": 0.7, "label": "b"}
            ]
        }))
        .unwrap();
        let objects = translate(body, 0.0, 1).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].class_name, "b");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let detector = RemoteDetector::new("http://detector:8080/", Arc::new(MemoryStorage::new()));
        assert_eq!(detector.endpoint(), "http://detector:8080/detect");
    }

    #[tokio::test]
    async fn missing_image_fails_before_calling_service() {
        let detector = RemoteDetector::new("http://127.0.0.1:9", Arc::new(MemoryStorage::new()));
        let result = detector
            .detect(&DetectionRequest {
                detection_id: 1,
                image_key: "image_404.png".into(),
                model_key: None,
                confidence_threshold: 0.5,
                max_detections: 10,
            })
            .await;
        assert_matches!(result, Err(PipelineError::Storage(_)));
    }
}

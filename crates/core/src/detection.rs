//! Canonical detection output shape.
//!
//! Whatever detector backend produced them, boxes are translated into
//! [`DetectedObject`] (class name, confidence, top-left `x`/`y`, extent)
//! before being stored on a detection row.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// One detected object in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectedObject {
    pub class_name: String,
    pub confidence: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DetectedObject {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Stored result of a completed detection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectionOutcome {
    pub objects: Vec<DetectedObject>,
    /// Seconds spent in the detector.
    pub processing_time: f64,
}

/// Keep objects at or above `threshold`, highest confidence first, at most
/// `max_detections` of them.
pub fn filter_detections(
    mut objects: Vec<DetectedObject>,
    threshold: f64,
    max_detections: usize,
) -> Vec<DetectedObject> {
    objects.retain(|o| o.confidence >= threshold);
    objects.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    objects.truncate(max_detections);
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, confidence: f64) -> DetectedObject {
        DetectedObject {
            class_name: name.into(),
            confidence,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn filter_drops_low_confidence_and_sorts() {
        let objects = vec![object("a", 0.4), object("b", 0.9), object("c", 0.6)];
        let kept = filter_detections(objects, 0.5, 10);
        let names: Vec<_> = kept.iter().map(|o| o.class_name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[test]
    fn filter_truncates_to_max() {
        let objects = vec![object("a", 0.7), object("b", 0.9), object("c", 0.8)];
        let kept = filter_detections(objects, 0.0, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_name, "b");
    }
}

//! Annotation geometry.
//!
//! An annotation is either an axis-aligned bounding box or a polygon. The
//! JSON representation is tagged by `format`, which doubles as the value of
//! the `annotations.format` column.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Format tag for bounding-box annotations.
pub const FORMAT_BBOX: &str = "bbox";

/// Format tag for polygon annotations.
pub const FORMAT_POLYGON: &str = "polygon";

/// Minimum vertex count for a polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A vertex in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box: top-left corner plus extent, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Build a box from corner coordinates (`x1,y1` top-left, `x2,y2`
    /// bottom-right). Corners given in the wrong order are swapped.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (top, bottom) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.x.is_finite() || !self.y.is_finite() || self.x < 0.0 || self.y < 0.0 {
            return Err(CoreError::Validation(format!(
                "bounding box origin must be non-negative, got ({}, {})",
                self.x, self.y
            )));
        }
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(CoreError::Validation(format!(
                "bounding box must have positive width and height, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Geometry of one annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum Geometry {
    Bbox(BoundingBox),
    Polygon { points: Vec<Point> },
}

impl Geometry {
    /// The `format` tag stored alongside the geometry.
    pub fn format(&self) -> &'static str {
        match self {
            Geometry::Bbox(_) => FORMAT_BBOX,
            Geometry::Polygon { .. } => FORMAT_POLYGON,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Geometry::Bbox(bbox) => bbox.validate(),
            Geometry::Polygon { points } => {
                if points.len() < MIN_POLYGON_POINTS {
                    return Err(CoreError::Validation(format!(
                        "polygon needs at least {MIN_POLYGON_POINTS} points, got {}",
                        points.len()
                    )));
                }
                if points
                    .iter()
                    .any(|p| !p.x.is_finite() || !p.y.is_finite() || p.x < 0.0 || p.y < 0.0)
                {
                    return Err(CoreError::Validation(
                        "polygon points must be non-negative".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

//! Domain types shared by every LabelForge crate: error taxonomy, id aliases,
//! annotation geometry, typed training/detection payloads and the small
//! validation helpers used at the service boundary.

pub mod color;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod jobs;
pub mod pagination;
pub mod threshold_validation;
pub mod training;
pub mod types;

//! Job routines run by the worker: training, detection and model export.
//!
//! None of these do real machine learning. [`FixtureTrainer`] reports a
//! fixed metrics set and stores a placeholder artifact; detection either
//! returns static boxes or delegates to an external detector service over
//! HTTP; export writes a placeholder file per target format.

use std::sync::Arc;

use labelforge_storage::SharedStore;

pub mod config;
pub mod detector;
pub mod error;
pub mod exporter;
pub mod remote;
pub mod trainer;

pub use config::{DetectorBackend, PipelineConfig};
pub use detector::{DetectionRequest, Detector, StaticDetector};
pub use error::PipelineError;
pub use exporter::ModelExporter;
pub use remote::RemoteDetector;
pub use trainer::{FixtureTrainer, Trainer, TrainingOutcome, TrainingRequest};

/// Build the detector selected by `config.detector_backend`.
pub fn build_detector(
    config: &PipelineConfig,
    store: SharedStore,
) -> Result<Arc<dyn Detector>, PipelineError> {
    match config.detector_backend {
        DetectorBackend::Static => Ok(Arc::new(StaticDetector)),
        DetectorBackend::Remote => {
            let url = config.detector_url.clone().ok_or_else(|| {
                PipelineError::InvalidInput("DETECTOR_URL is required for the remote detector".into())
            })?;
            Ok(Arc::new(RemoteDetector::new(url, store)))
        }
    }
}

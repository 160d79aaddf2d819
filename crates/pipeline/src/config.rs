use labelforge_core::threshold_validation::validate_unit_range;
use labelforge_core::training::TrainingDefaults;

/// Which detector implementation the worker uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorBackend {
    /// Fixed boxes, no external dependency.
    Static,
    /// HTTP call to an external detector service.
    Remote,
}

impl DetectorBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "static" => Some(Self::Static),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// Defaults and backend selection for job routines.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub confidence_threshold: f64,
    pub nms_threshold: f64,
    pub max_detections: usize,
    pub training: TrainingDefaults,
    pub detector_backend: DetectorBackend,
    pub detector_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            nms_threshold: 0.45,
            max_detections: 100,
            training: TrainingDefaults::default(),
            detector_backend: DetectorBackend::Static,
            detector_url: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                        | Default  |
    /// |--------------------------------|----------|
    /// | `DEFAULT_CONFIDENCE_THRESHOLD` | `0.5`    |
    /// | `DEFAULT_NMS_THRESHOLD`        | `0.45`   |
    /// | `DEFAULT_MAX_DETECTIONS`       | `100`    |
    /// | `DEFAULT_EPOCHS`               | `100`    |
    /// | `DEFAULT_BATCH_SIZE`           | `16`     |
    /// | `DEFAULT_LEARNING_RATE`        | `0.001`  |
    /// | `DEFAULT_IMAGE_SIZE`           | `640`    |
    /// | `DETECTOR_BACKEND`             | `static` |
    /// | `DETECTOR_URL`                 | unset    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let confidence_threshold: f64 =
            env_or("DEFAULT_CONFIDENCE_THRESHOLD", defaults.confidence_threshold)
                .expect("DEFAULT_CONFIDENCE_THRESHOLD must be a number");
        validate_unit_range(confidence_threshold, "DEFAULT_CONFIDENCE_THRESHOLD")
            .expect("DEFAULT_CONFIDENCE_THRESHOLD out of range");

        let nms_threshold: f64 = env_or("DEFAULT_NMS_THRESHOLD", defaults.nms_threshold)
            .expect("DEFAULT_NMS_THRESHOLD must be a number");
        validate_unit_range(nms_threshold, "DEFAULT_NMS_THRESHOLD")
            .expect("DEFAULT_NMS_THRESHOLD out of range");

        let training = TrainingDefaults {
            epochs: env_or("DEFAULT_EPOCHS", defaults.training.epochs)
                .expect("DEFAULT_EPOCHS must be a positive integer"),
            batch_size: env_or("DEFAULT_BATCH_SIZE", defaults.training.batch_size)
                .expect("DEFAULT_BATCH_SIZE must be a positive integer"),
            learning_rate: env_or("DEFAULT_LEARNING_RATE", defaults.training.learning_rate)
                .expect("DEFAULT_LEARNING_RATE must be a number"),
            image_size: env_or("DEFAULT_IMAGE_SIZE", defaults.training.image_size)
                .expect("DEFAULT_IMAGE_SIZE must be a positive integer"),
        };

        let backend = std::env::var("DETECTOR_BACKEND").unwrap_or_else(|_| "static".into());
        let detector_backend = DetectorBackend::parse(&backend)
            .expect("DETECTOR_BACKEND must be 'static' or 'remote'");

        Self {
            confidence_threshold,
            nms_threshold,
            max_detections: env_or("DEFAULT_MAX_DETECTIONS", defaults.max_detections)
                .expect("DEFAULT_MAX_DETECTIONS must be a positive integer"),
            training,
            detector_backend,
            detector_url: std::env::var("DETECTOR_URL").ok().filter(|u| !u.is_empty()),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, T::Err> {
    match std::env::var(key) {
        Ok(raw) => raw.parse(),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(DetectorBackend::parse("static"), Some(DetectorBackend::Static));
        assert_eq!(DetectorBackend::parse("remote"), Some(DetectorBackend::Remote));
        assert_eq!(DetectorBackend::parse("yolo"), None);
    }

    #[test]
    fn env_or_falls_back_when_unset() {
        let value: u32 = env_or("LABELFORGE_TEST_SURELY_UNSET", 7).unwrap();
        assert_eq!(value, 7);
    }
}

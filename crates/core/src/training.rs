//! Training configuration and metrics.
//!
//! Clients submit a partial [`TrainingConfigInput`]; the API resolves it
//! against [`TrainingDefaults`] into a complete [`TrainingConfig`] before the
//! training row is written, so the worker never has to guess.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::threshold_validation::validate_positive;

/// Upper bound on epochs accepted from clients.
pub const MAX_EPOCHS: u32 = 10_000;

/// Upper bound on batch size accepted from clients.
pub const MAX_BATCH_SIZE: u32 = 1024;

/// Hyperparameters as submitted by a client. Missing fields fall back to
/// [`TrainingDefaults`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrainingConfigInput {
    pub epochs: Option<u32>,
    pub batch_size: Option<u32>,
    pub learning_rate: Option<f64>,
    pub image_size: Option<u32>,
}

/// Fallback hyperparameters, loaded from the environment by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingDefaults {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub image_size: u32,
}

impl Default for TrainingDefaults {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: 16,
            learning_rate: 0.001,
            image_size: 640,
        }
    }
}

/// Fully resolved hyperparameters stored on a training row.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TrainingConfig {
    pub epochs: u32,
    pub batch_size: u32,
    pub learning_rate: f64,
    pub image_size: u32,
}

impl TrainingConfigInput {
    /// Fill missing fields from `defaults` and validate the result.
    pub fn resolve(&self, defaults: &TrainingDefaults) -> Result<TrainingConfig, CoreError> {
        let config = TrainingConfig {
            epochs: self.epochs.unwrap_or(defaults.epochs),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            learning_rate: self.learning_rate.unwrap_or(defaults.learning_rate),
            image_size: self.image_size.unwrap_or(defaults.image_size),
        };
        config.validate()?;
        Ok(config)
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.epochs == 0 || self.epochs > MAX_EPOCHS {
            return Err(CoreError::Validation(format!(
                "epochs must be between 1 and {MAX_EPOCHS}, got {}",
                self.epochs
            )));
        }
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(CoreError::Validation(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        if self.image_size == 0 || self.image_size % 32 != 0 {
            return Err(CoreError::Validation(format!(
                "image_size must be a positive multiple of 32, got {}",
                self.image_size
            )));
        }
        validate_positive(self.learning_rate, "learning_rate")
    }
}

/// Loss/mAP sample for one epoch.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EpochMetric {
    pub epoch: u32,
    pub loss: f64,
    pub val_loss: f64,
    #[serde(rename = "mAP50")]
    pub map50: f64,
}

/// Result metrics of a training run, also copied onto the trained model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainingMetrics {
    pub epochs: u32,
    pub batch_size: u32,
    pub final_loss: f64,
    pub val_loss: f64,
    #[serde(rename = "mAP50")]
    pub map50: f64,
    #[serde(rename = "mAP50-95")]
    pub map50_95: f64,
    pub precision: f64,
    pub recall: f64,
    /// Wall-clock training time in seconds.
    pub training_time: u64,
    pub epoch_metrics: Vec<EpochMetric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_missing_fields() {
        let input = TrainingConfigInput {
            epochs: Some(50),
            ..Default::default()
        };
        let config = input.resolve(&TrainingDefaults::default()).unwrap();
        assert_eq!(config.epochs, 50);
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.image_size, 640);
    }

    #[test]
    fn resolve_rejects_zero_epochs() {
        let input = TrainingConfigInput {
            epochs: Some(0),
            ..Default::default()
        };
        assert!(input.resolve(&TrainingDefaults::default()).is_err());
    }

    #[test]
    fn image_size_must_be_multiple_of_32() {
        let input = TrainingConfigInput {
            image_size: Some(500),
            ..Default::default()
        };
        assert!(input.resolve(&TrainingDefaults::default()).is_err());
    }

    #[test]
    fn metrics_use_map_field_names() {
        let metrics = TrainingMetrics {
            epochs: 1,
            batch_size: 1,
            final_loss: 0.1,
            val_loss: 0.2,
            map50: 0.5,
            map50_95: 0.4,
            precision: 0.3,
            recall: 0.2,
            training_time: 1,
            epoch_metrics: vec![],
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["mAP50"], 0.5);
        assert_eq!(json["mAP50-95"], 0.4);
    }
}

//! Training routine.
//!
//! [`FixtureTrainer`] stands in for a real training engine: it reports a
//! fixed metrics set shaped by the requested epochs and batch size, and
//! stores a JSON placeholder where the weights file would go.

use std::time::Instant;

use async_trait::async_trait;
use labelforge_core::training::{EpochMetric, TrainingConfig, TrainingMetrics};
use labelforge_core::types::DbId;
use labelforge_storage::{Bucket, SharedStore};

use crate::error::PipelineError;

/// Input of one training run.
#[derive(Debug, Clone)]
pub struct TrainingRequest {
    pub training_id: DbId,
    pub dataset_id: DbId,
    pub model_id: DbId,
    pub config: TrainingConfig,
}

/// Result of a successful training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub metrics: TrainingMetrics,
    /// Key of the trained weights in the models bucket.
    pub artifact_key: String,
}

#[async_trait]
pub trait Trainer: Send + Sync {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainingOutcome, PipelineError>;
}

/// Object key of a model's trained weights.
pub fn artifact_key(model_id: DbId) -> String {
    format!("model_{model_id}.pt")
}

/// (loss, val_loss, mAP50) reported at epochs 1, e/4, e/2, 3e/4 and e.
const EPOCH_CURVE: [(f64, f64, f64); 5] = [
    (0.9876, 0.9234, 0.123),
    (0.4567, 0.5432, 0.456),
    (0.2345, 0.3456, 0.678),
    (0.1234, 0.2345, 0.789),
    (0.0342, 0.0456, 0.892),
];

/// Fixed metrics for a run with `config`.
pub fn fixture_metrics(config: &TrainingConfig) -> TrainingMetrics {
    let e = config.epochs;
    let checkpoints = [1, e / 4, e / 2, 3 * e / 4, e];
    let mut epoch_metrics: Vec<EpochMetric> = checkpoints
        .iter()
        .zip(EPOCH_CURVE)
        .map(|(&epoch, (loss, val_loss, map50))| EpochMetric {
            epoch: epoch.max(1),
            loss,
            val_loss,
            map50,
        })
        .collect();
    // Short runs map several checkpoints onto the same epoch; keep the latest.
    epoch_metrics.reverse();
    epoch_metrics.dedup_by_key(|m| m.epoch);
    epoch_metrics.reverse();

    TrainingMetrics {
        epochs: config.epochs,
        batch_size: config.batch_size,
        final_loss: 0.0342,
        val_loss: 0.0456,
        map50: 0.892,
        map50_95: 0.724,
        precision: 0.86,
        recall: 0.83,
        training_time: 3600,
        epoch_metrics,
    }
}

/// Trainer that reports [`fixture_metrics`] and stores a placeholder
/// artifact.
pub struct FixtureTrainer {
    store: SharedStore,
}

impl FixtureTrainer {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Trainer for FixtureTrainer {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainingOutcome, PipelineError> {
        let started = Instant::now();
        let metrics = fixture_metrics(&request.config);
        let key = artifact_key(request.model_id);

        let artifact = serde_json::json!({
            "model_id": request.model_id,
            "training_id": request.training_id,
            "dataset_id": request.dataset_id,
            "config": request.config,
            "metrics": metrics,
            "placeholder": true,
        });
        let body = serde_json::to_vec_pretty(&artifact)
            .map_err(|e| PipelineError::InvalidInput(format!("encode artifact: {e}")))?;
        self.store
            .put(Bucket::Models, &key, body, "application/json")
            .await?;

        tracing::info!(
            training_id = request.training_id,
            model_id = request.model_id,
            epochs = request.config.epochs,
            artifact = %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Training finished",
        );
        Ok(TrainingOutcome {
            metrics,
            artifact_key: key,
        })
    }
}

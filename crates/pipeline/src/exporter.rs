//! Model export routine.

use labelforge_core::jobs::validate_export_format;
use labelforge_core::types::DbId;
use labelforge_storage::{content_type_for, Bucket, SharedStore};

use crate::error::PipelineError;

/// Object key of an exported model.
pub fn export_key(model_id: DbId, format: &str) -> String {
    format!("model_{model_id}.{format}")
}

/// Writes a placeholder file per export format next to the trained
/// weights.
pub struct ModelExporter {
    store: SharedStore,
}

impl ModelExporter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Export the weights at `artifact_key` to `format`, returning the key
    /// of the exported object.
    pub async fn export(
        &self,
        model_id: DbId,
        artifact_key: &str,
        format: &str,
    ) -> Result<String, PipelineError> {
        validate_export_format(format).map_err(|e| PipelineError::InvalidInput(e.to_string()))?;
        let weights = self.store.get(Bucket::Models, artifact_key).await?;

        let key = export_key(model_id, format);
        let body = serde_json::to_vec_pretty(&serde_json::json!({
            "model_id": model_id,
            "format": format,
            "source": artifact_key,
            "source_size": weights.len(),
            "placeholder": true,
        }))
        .map_err(|e| PipelineError::InvalidInput(format!("encode export: {e}")))?;

        self.store
            .put(Bucket::Models, &key, body, content_type_for(format))
            .await?;
        tracing::info!(model_id, format, key = %key, "Model exported");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use labelforge_storage::{MemoryStorage, ObjectStore};

    use super::*;

    #[tokio::test]
    async fn export_writes_format_specific_key() {
        let store = Arc::new(MemoryStorage::new());
        store
            .put(Bucket::Models, "model_4.pt", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        let exporter = ModelExporter::new(store.clone());

        let key = exporter.export(4, "model_4.pt", "onnx").await.unwrap();
        assert_eq!(key, "model_4.onnx");
        assert!(store.contains(Bucket::Models, "model_4.onnx").await);
    }

    #[tokio::test]
    async fn unknown_format_is_rejected() {
        let exporter = ModelExporter::new(Arc::new(MemoryStorage::new()));
        let result = exporter.export(4, "model_4.pt", "zip").await;
        assert_matches!(result, Err(PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_weights_fail() {
        let exporter = ModelExporter::new(Arc::new(MemoryStorage::new()));
        let result = exporter.export(4, "model_4.pt", "onnx").await;
        assert_matches!(result, Err(PipelineError::Storage(_)));
    }
}

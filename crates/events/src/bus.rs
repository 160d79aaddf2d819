//! In-process status bus backed by a `tokio::sync::broadcast` channel.

use labelforge_core::types::{DbId, TaskId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// StatusUpdate
// ---------------------------------------------------------------------------

/// A job status change, serialized as `{task_id, status, data?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Task handle; free-form for manually broadcast updates.
    pub task_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl StatusUpdate {
    pub fn new(task_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: status.into(),
            data: None,
        }
    }

    /// Update for a queued job, carrying the entity it acts on.
    pub fn for_job(task_id: TaskId, status: &str, kind: &str, entity_id: DbId) -> Self {
        Self::new(task_id.to_string(), status).with_data(serde_json::json!({
            "kind": kind,
            "entity_id": entity_id,
        }))
    }

    /// Merge `data` into the payload. Object keys are added to an existing
    /// object payload; any other value replaces it.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        match (&mut self.data, data) {
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(extra)) => {
                existing.extend(extra);
            }
            (slot, data) => *slot = Some(data),
        }
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out of [`StatusUpdate`]s.
///
/// When the buffer is full the oldest unconsumed updates are dropped and
/// slow receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<StatusUpdate>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped silently when nobody
    /// is subscribed.
    pub fn publish(&self, update: StatusUpdate) {
        let _ = self.sender.send(update);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multiple_subscribers_receive_same_update() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(StatusUpdate::new("abc", "processing"));

        assert_eq!(rx1.recv().await.unwrap().status, "processing");
        assert_eq!(rx2.recv().await.unwrap().task_id, "abc");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        EventBus::default().publish(StatusUpdate::new("orphan", "failed"));
    }

    #[test]
    fn data_is_omitted_when_absent() {
        let json = serde_json::to_value(StatusUpdate::new("t", "completed")).unwrap();
        assert_eq!(json, serde_json::json!({"task_id": "t", "status": "completed"}));
    }

    #[test]
    fn with_data_merges_objects() {
        let update = StatusUpdate::for_job(uuid_nil(), "failed", "train", 3)
            .with_data(serde_json::json!({"error": "boom"}));
        let data = update.data.unwrap();
        assert_eq!(data["kind"], "train");
        assert_eq!(data["entity_id"], 3);
        assert_eq!(data["error"], "boom");
    }

    fn uuid_nil() -> TaskId {
        TaskId::nil()
    }
}

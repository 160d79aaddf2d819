use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use labelforge_events::StatusUpdate;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Outcome of a fan-out to every registered connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Connections whose queue accepted the message.
    pub delivered: usize,
    /// Connections whose queue was full; the message was dropped for them.
    pub dropped: usize,
    /// Connections found closed and removed.
    pub closed: usize,
}

/// Registry of open status connections.
///
/// Each connection owns a bounded queue drained by its own sender task.
/// Sends never wait: a full queue drops the message for that connection
/// only, and a closed queue unregisters the connection.
pub struct StatusHub {
    peers: RwLock<HashMap<String, mpsc::Sender<Message>>>,
    capacity: usize,
}

impl StatusHub {
    /// `capacity` is the per-connection queue length and must be non-zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a connection and return the receiver its sender task drains.
    pub async fn register(&self, conn_id: String) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.peers.write().await.insert(conn_id, tx);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.peers.write().await.remove(conn_id);
    }

    pub async fn connection_count(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Queue `message` for one connection. Returns `false` if the
    /// connection is unknown, closed, or its queue is full.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        let peers = self.peers.read().await;
        match peers.get(conn_id) {
            Some(tx) => tx.try_send(message).is_ok(),
            None => false,
        }
    }

    /// Fan a status update out to every connection as JSON text.
    pub async fn broadcast(&self, update: &StatusUpdate) -> BroadcastReport {
        match serde_json::to_string(update) {
            Ok(text) => self.broadcast_message(Message::Text(text.into())).await,
            Err(e) => {
                tracing::error!(error = %e, task_id = %update.task_id, "Failed to encode status update");
                BroadcastReport::default()
            }
        }
    }

    /// Queue `message` on every connection without waiting on any of them.
    pub async fn broadcast_message(&self, message: Message) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();
        {
            let peers = self.peers.read().await;
            for (conn_id, tx) in peers.iter() {
                match tx.try_send(message.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(conn_id = %conn_id, "Status queue full, message dropped");
                        report.dropped += 1;
                    }
                    Err(TrySendError::Closed(_)) => closed.push(conn_id.clone()),
                }
            }
        }

        if !closed.is_empty() {
            let mut peers = self.peers.write().await;
            for conn_id in &closed {
                peers.remove(conn_id);
            }
            report.closed = closed.len();
            tracing::debug!(closed = report.closed, "Removed closed status connections");
        }
        report
    }

    /// Send a Ping frame to every connection.
    pub async fn ping_all(&self) -> BroadcastReport {
        self.broadcast_message(Message::Ping(Bytes::new())).await
    }

    /// Send a Close frame to every connection, then clear the registry.
    pub async fn shutdown_all(&self) {
        let mut peers = self.peers.write().await;
        let count = peers.len();
        for tx in peers.values() {
            let _ = tx.try_send(Message::Close(None));
        }
        peers.clear();
        tracing::info!(count, "Closed all status connections");
    }
}

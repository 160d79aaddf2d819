use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde_json::json;

use crate::state::AppState;
use crate::ws::hub::StatusHub;

/// GET /api/v1/ws/status
///
/// Upgrades to a WebSocket registered with the [`StatusHub`].
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

/// Reply to one inbound text frame: the parsed JSON wrapped in a
/// `received` acknowledgement, or an error for malformed input.
pub fn acknowledge(text: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(message) => json!({ "status": "received", "message": message }),
        Err(_) => json!({ "status": "error", "message": "Invalid JSON" }),
    }
}

async fn handle_socket(socket: WebSocket, hub: Arc<StatusHub>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "Status connection opened");

    let mut rx = hub.register(conn_id.clone()).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "Status sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let reply = acknowledge(text.as_str()).to_string();
                if !hub.send_to(&conn_id, Message::Text(reply.into())).await {
                    tracing::debug!(conn_id = %conn_id, "Acknowledgement dropped");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "Status connection receive error");
                break;
            }
        }
    }

    hub.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Status connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_is_wrapped() {
        let reply = acknowledge(r#"{"ping": 1}"#);
        assert_eq!(reply["status"], "received");
        assert_eq!(reply["message"]["ping"], 1);
    }

    #[test]
    fn invalid_json_yields_error_reply() {
        let reply = acknowledge("not json");
        assert_eq!(reply, json!({ "status": "error", "message": "Invalid JSON" }));
    }
}

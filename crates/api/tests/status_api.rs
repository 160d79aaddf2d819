//! Tests for the status broadcast endpoint and its fan-out to open
//! status connections.

mod common;

use std::sync::Arc;

use axum::extract::ws::Message;
use axum::http::StatusCode;
use common::{body_json, post_json};
use labelforge_storage::MemoryStorage;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn broadcast_without_connections_delivers_nothing(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/status/broadcast",
        json!({"task_id": "abc", "status": "processing"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], json!({"delivered": 0, "dropped": 0, "closed": 0}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn broadcast_reaches_registered_connections(pool: PgPool) {
    let (app, _, hub) = common::build_test_app_with_store(pool, Arc::new(MemoryStorage::new()));
    let mut first = hub.register("conn-1".into()).await;
    let mut second = hub.register("conn-2".into()).await;

    let response = post_json(
        app,
        "/api/v1/status/broadcast",
        json!({"task_id": "abc", "status": "completed", "data": {"progress": 100}}),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["delivered"], 2);

    for rx in [&mut first, &mut second] {
        let Some(Message::Text(text)) = rx.recv().await else {
            panic!("expected a text frame");
        };
        let payload: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(payload["task_id"], "abc");
        assert_eq!(payload["status"], "completed");
        assert_eq!(payload["data"]["progress"], 100);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn broadcast_requires_task_id_and_status(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/status/broadcast", json!({"status": "x"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use labelforge_api::config::ServerConfig;
use labelforge_api::router::build_app_router;
use labelforge_api::state::AppState;
use labelforge_api::ws::StatusHub;
use labelforge_pipeline::PipelineConfig;
use labelforge_storage::MemoryStorage;

/// Build a test `ServerConfig` with safe defaults and a per-process upload
/// directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: upload_dir(),
        max_upload_bytes: 1024 * 1024,
        presign_expiry_secs: 3600,
        status_queue_capacity: 16,
    }
}

fn upload_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("labelforge-test-uploads-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create test upload dir");
    dir
}

/// Build the full application router over in-memory object storage.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_store(pool, Arc::new(MemoryStorage::new())).0
}

/// Like [`build_test_app`], also returning the store and status hub so
/// tests can inspect them.
pub fn build_test_app_with_store(
    pool: PgPool,
    store: Arc<MemoryStorage>,
) -> (Router, Arc<MemoryStorage>, Arc<StatusHub>) {
    let config = test_config();
    let hub = Arc::new(StatusHub::new(config.status_queue_capacity));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store: store.clone(),
        hub: Arc::clone(&hub),
        pipeline: Arc::new(PipelineConfig::default()),
    };
    (build_app_router(state, &config), store, hub)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PUT, uri, body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::DELETE, uri, body)).await
}

const BOUNDARY: &str = "labelforge-test-boundary";

/// POST a multipart form. Each part is `(name, filename, bytes)`.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    parts: &[(&str, Option<&str>, &[u8])],
) -> Response {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Encode a solid `width` x `height` PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// `data.id` of a response envelope.
pub async fn created_id(response: Response) -> i64 {
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

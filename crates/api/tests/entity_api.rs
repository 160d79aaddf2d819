//! HTTP-level tests for datasets, images, classes and models.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, created_id, delete, delete_json, get, png_bytes, post_json, post_multipart,
    put_json,
};
use labelforge_storage::{Bucket, MemoryStorage, ObjectStore};
use serde_json::json;
use sqlx::PgPool;

async fn create_dataset(pool: &PgPool, name: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    created_id(post_json(app, "/api/v1/datasets", json!({"name": name})).await).await
}

async fn upload_png(app: axum::Router, dataset_id: Option<i64>) -> axum::response::Response {
    let png = png_bytes(32, 24);
    let dataset = dataset_id.map(|id| id.to_string());
    let mut parts: Vec<(&str, Option<&str>, &[u8])> = vec![("file", Some("cat.png"), png.as_slice())];
    if let Some(dataset) = &dataset {
        parts.push(("dataset_id", None, dataset.as_bytes()));
    }
    post_multipart(app, "/api/v1/images", &parts).await
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_dataset_returns_201_with_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/datasets", json!({"name": "Street scenes"})).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Street scenes");
    assert_eq!(json["data"]["format"], "yolo");
    assert!(json["data"]["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dataset_crud_round(pool: PgPool) {
    let id = create_dataset(&pool, "Original").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/datasets/{id}"),
        json!({"description": "Night shots"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Original");
    assert_eq!(json["data"]["description"], "Night shots");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/datasets/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/datasets/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_datasets_reports_total_and_pages(pool: PgPool) {
    for name in ["A", "B", "C"] {
        create_dataset(&pool, name).await;
    }

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/datasets?skip=1&limit=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "B");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_dataset_name_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/datasets", json!({"name": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_uses_error_envelope(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/datasets", json!({"description": "no name"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn attach_detach_and_stats(pool: PgPool) {
    let dataset_id = create_dataset(&pool, "Members").await;
    let other_id = create_dataset(&pool, "Other").await;
    let app = common::build_test_app(pool.clone());
    let image_id = created_id(upload_png(app, None).await).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/datasets/{dataset_id}/images"),
        json!({"image_ids": [image_id, 999999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["updated"], 1);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/datasets/{dataset_id}/stats")).await).await;
    assert_eq!(json["data"]["images_count"], 1);
    assert_eq!(json["data"]["labeled_images_count"], 0);

    // Detaching from a dataset the image is not in changes nothing.
    let app = common::build_test_app(pool.clone());
    let response = delete_json(
        app,
        &format!("/api/v1/datasets/{other_id}/images"),
        json!({"image_ids": [image_id]}),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["updated"], 0);

    let app = common::build_test_app(pool.clone());
    let response = delete_json(
        app,
        &format!("/api/v1/datasets/{dataset_id}/images"),
        json!({"image_ids": [image_id]}),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["updated"], 1);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/datasets/{dataset_id}/images")).await).await;
    assert_eq!(json["total"], 0);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_stores_object_and_reads_dimensions(pool: PgPool) {
    let dataset_id = create_dataset(&pool, "Uploads").await;
    let (app, store, _) =
        common::build_test_app_with_store(pool.clone(), Arc::new(MemoryStorage::new()));

    let response = upload_png(app, Some(dataset_id)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let image = &json["data"];
    assert_eq!(image["width"], 32);
    assert_eq!(image["height"], 24);
    assert_eq!(image["format"], "png");
    assert_eq!(image["dataset_id"], dataset_id);
    assert_eq!(image["is_labeled"], false);

    let key = image["path"].as_str().unwrap();
    assert_eq!(key, format!("image_{}.png", image["id"]));
    assert!(store.contains(Bucket::Images, key).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_with_unsupported_extension_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_multipart(
        app,
        "/api/v1/images",
        &[("file", Some("notes.txt"), b"hello".as_slice())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upload_of_corrupt_image_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_multipart(
        app,
        "/api/v1/images",
        &[("file", Some("broken.png"), b"not a png".as_slice())],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_storage_write_leaves_no_row(pool: PgPool) {
    let store = Arc::new(MemoryStorage::new());
    store.set_fail_writes(true);
    let (app, _, _) = common::build_test_app_with_store(pool.clone(), store);

    let response = upload_png(app, None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "STORAGE_ERROR");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_image_removes_object(pool: PgPool) {
    let store = Arc::new(MemoryStorage::new());
    let (app, _, _) = common::build_test_app_with_store(pool.clone(), store.clone());
    let json = body_json(upload_png(app, None).await).await;
    let id = json["data"]["id"].as_i64().unwrap();
    let key = json["data"]["path"].as_str().unwrap().to_string();

    let (app, _, _) = common::build_test_app_with_store(pool.clone(), store.clone());
    let response = delete(app, &format!("/api/v1/images/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!store.contains(Bucket::Images, &key).await);

    let (app, _, _) = common::build_test_app_with_store(pool, store);
    let response = get(app, &format!("/api/v1/images/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn image_url_is_presigned(pool: PgPool) {
    let store = Arc::new(MemoryStorage::new());
    let (app, _, _) = common::build_test_app_with_store(pool.clone(), store.clone());
    let id = created_id(upload_png(app, None).await).await;

    let (app, _, _) = common::build_test_app_with_store(pool, store);
    let response = get(app, &format!("/api/v1/images/{id}/url")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["expires_in"], 3600);
    assert!(json["data"]["url"]
        .as_str()
        .unwrap()
        .contains(&format!("image_{id}.png")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_images_filters_by_dataset(pool: PgPool) {
    let dataset_id = create_dataset(&pool, "Filter").await;
    let app = common::build_test_app(pool.clone());
    upload_png(app, Some(dataset_id)).await;
    let app = common::build_test_app(pool.clone());
    upload_png(app, None).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/images").await).await;
    assert_eq!(json["total"], 2);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/images?dataset_id={dataset_id}")).await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["dataset_id"], dataset_id);
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn class_without_color_gets_a_random_one(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/classes", json!({"name": "person"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let color = json["data"]["color"].as_str().unwrap();
    assert_eq!(color.len(), 7);
    assert!(color.starts_with('#'));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_class_color_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/classes",
        json!({"name": "car", "color": "red"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_class_name_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    post_json(app, "/api/v1/classes", json!({"name": "dog", "color": "#00ff00"})).await;

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/classes", json!({"name": "dog"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_model_applies_defaults(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/models", json!({"name": "detector-v1"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "created");
    assert_eq!(json["data"]["config"], json!({}));
    assert!(json["data"]["path"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn model_config_must_be_an_object(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/models",
        json!({"name": "bad", "config": [1, 2]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn untrained_model_has_no_download_or_metrics(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let id = created_id(post_json(app, "/api/v1/models", json!({"name": "fresh"})).await).await;

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/models/{id}/download")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/models/{id}/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_model_removes_trained_artifact(pool: PgPool) {
    let store = Arc::new(MemoryStorage::new());
    let (app, _, _) = common::build_test_app_with_store(pool.clone(), store.clone());
    let id = created_id(post_json(app, "/api/v1/models", json!({"name": "trained"})).await).await;

    let key = format!("model_{id}.pt");
    sqlx::query("UPDATE models SET path = $2, status = 'trained' WHERE id = $1")
        .bind(id)
        .bind(&key)
        .execute(&pool)
        .await
        .unwrap();
    store
        .put(Bucket::Models, &key, b"{}".to_vec(), "application/json")
        .await
        .unwrap();

    let (app, _, _) = common::build_test_app_with_store(pool, store.clone());
    let response = delete(app, &format!("/api/v1/models/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!store.contains(Bucket::Models, &key).await);
}

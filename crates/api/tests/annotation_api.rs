//! HTTP-level tests for annotations and their effect on images and classes.

mod common;

use axum::http::StatusCode;
use common::{body_json, created_id, delete, get, png_bytes, post_json, post_multipart, put_json};
use serde_json::json;
use sqlx::PgPool;

struct Fixture {
    image_id: i64,
    class_id: i64,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let png = png_bytes(64, 48);
    let app = common::build_test_app(pool.clone());
    let image_id = created_id(
        post_multipart(app, "/api/v1/images", &[("file", Some("a.png"), png.as_slice())]).await,
    )
    .await;
    let app = common::build_test_app(pool.clone());
    let class_id = created_id(
        post_json(app, "/api/v1/classes", json!({"name": "person", "color": "#ff0000"})).await,
    )
    .await;
    Fixture { image_id, class_id }
}

fn bbox(image_id: i64, class_id: i64) -> serde_json::Value {
    json!({
        "image_id": image_id,
        "class_id": class_id,
        "geometry": {"format": "bbox", "x": 1.0, "y": 2.0, "width": 10.0, "height": 20.0},
    })
}

async fn is_labeled(pool: &PgPool, image_id: i64) -> bool {
    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &format!("/api/v1/images/{image_id}")).await).await;
    json["data"]["is_labeled"].as_bool().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn creating_annotation_labels_the_image(pool: PgPool) {
    let f = fixture(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/annotations", bbox(f.image_id, f.class_id)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["format"], "bbox");
    assert_eq!(json["data"]["geometry"]["width"], 10.0);

    assert!(is_labeled(&pool, f.image_id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_last_annotation_unlabels_the_image(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool.clone());
    let id = created_id(post_json(app, "/api/v1/annotations", bbox(f.image_id, f.class_id)).await)
        .await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/annotations/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!is_labeled(&pool, f.image_id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn polygon_needs_three_points(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/annotations",
        json!({
            "image_id": f.image_id,
            "class_id": f.class_id,
            "geometry": {"format": "polygon", "points": [{"x": 0.0, "y": 0.0}, {"x": 1.0, "y": 1.0}]},
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn annotation_for_missing_image_is_rejected(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/annotations", bbox(999999, f.class_id)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_create_is_all_or_nothing(pool: PgPool) {
    let f = fixture(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/annotations/bulk",
        json!({"annotations": [bbox(f.image_id, f.class_id), bbox(f.image_id, 999999)]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("annotations[1]"));

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/annotations").await).await;
    assert_eq!(json["total"], 0);

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/annotations/bulk",
        json!({"annotations": [bbox(f.image_id, f.class_id), bbox(f.image_id, f.class_id)]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["total"], 2);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/images/{}/annotations", f.image_id)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_switches_geometry_format(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool.clone());
    let id = created_id(post_json(app, "/api/v1/annotations", bbox(f.image_id, f.class_id)).await)
        .await;

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/annotations/{id}"),
        json!({"geometry": {"format": "polygon", "points": [
            {"x": 0.0, "y": 0.0}, {"x": 5.0, "y": 0.0}, {"x": 5.0, "y": 5.0}
        ]}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["format"], "polygon");
    assert_eq!(json["data"]["geometry"]["points"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn class_in_use_cannot_be_deleted(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool.clone());
    post_json(app, "/api/v1/annotations", bbox(f.image_id, f.class_id)).await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/classes/{}", f.class_id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/classes/{}", f.class_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_image_cascades_to_annotations(pool: PgPool) {
    let f = fixture(&pool).await;
    let app = common::build_test_app(pool.clone());
    let id = created_id(post_json(app, "/api/v1/annotations", bbox(f.image_id, f.class_id)).await)
        .await;

    let app = common::build_test_app(pool.clone());
    delete(app, &format!("/api/v1/images/{}", f.image_id)).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/annotations/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! Integration tests for the labeling tables.
//!
//! Exercises the repository layer against a real database:
//! - Create / update / delete for datasets, images, classes, annotations
//! - `is_labeled` bookkeeping on annotation writes
//! - Unique class names and restricted class deletion
//! - Parent validation inside the inserting transaction
//! - Cascade and set-null delete rules

use assert_matches::assert_matches;
use labelforge_core::error::CoreError;
use labelforge_core::geometry::{BoundingBox, Geometry, Point};
use labelforge_db::models::annotation::{AnnotationFilter, CreateAnnotation, UpdateAnnotation};
use labelforge_db::models::dataset::{CreateDataset, UpdateDataset};
use labelforge_db::models::image::{Image, ImageFilter, NewImage, UpdateImage};
use labelforge_db::models::object_class::{CreateObjectClass, UpdateObjectClass};
use labelforge_db::repositories::{AnnotationRepo, DatasetRepo, ImageRepo, ObjectClassRepo};
use labelforge_db::DbError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_dataset(name: &str) -> CreateDataset {
    CreateDataset {
        name: name.to_string(),
        description: None,
        format: None,
    }
}

fn new_class(name: &str) -> CreateObjectClass {
    CreateObjectClass {
        name: name.to_string(),
        color: None,
        description: None,
    }
}

fn bbox() -> Geometry {
    Geometry::Bbox(BoundingBox {
        x: 10.0,
        y: 10.0,
        width: 50.0,
        height: 40.0,
    })
}

fn new_annotation(image_id: i64, class_id: i64) -> CreateAnnotation {
    CreateAnnotation {
        image_id,
        class_id,
        geometry: bbox(),
        confidence: None,
    }
}

async fn insert_image(pool: &PgPool, name: &str, dataset_id: Option<i64>) -> Image {
    let mut tx = pool.begin().await.unwrap();
    let image = ImageRepo::insert(
        &mut tx,
        &NewImage {
            name: name.to_string(),
            width: 640,
            height: 480,
            format: "png".to_string(),
            size: 1024,
            dataset_id,
        },
    )
    .await
    .unwrap();
    let image = ImageRepo::set_path(&mut tx, image.id, &format!("image_{}.png", image.id))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    image
}

async fn is_labeled(pool: &PgPool, image_id: i64) -> bool {
    ImageRepo::find_by_id(pool, image_id)
        .await
        .unwrap()
        .unwrap()
        .is_labeled
}

async fn annotation_count(pool: &PgPool) -> i64 {
    AnnotationRepo::count(pool, &AnnotationFilter::default())
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Datasets and images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dataset_crud_round_trip(pool: PgPool) {
    let dataset = DatasetRepo::create(&pool, &new_dataset("Street scenes"))
        .await
        .unwrap();
    assert_eq!(dataset.format, "yolo");

    let updated = DatasetRepo::update(
        &pool,
        dataset.id,
        &UpdateDataset {
            name: None,
            description: Some("daytime only".to_string()),
            format: None,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Street scenes");
    assert_eq!(updated.description.as_deref(), Some("daytime only"));

    assert!(DatasetRepo::delete(&pool, dataset.id).await.unwrap());
    assert!(DatasetRepo::find_by_id(&pool, dataset.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_ids_return_none_or_false(pool: PgPool) {
    assert!(DatasetRepo::find_by_id(&pool, 999).await.unwrap().is_none());
    assert!(DatasetRepo::update(
        &pool,
        999,
        &UpdateDataset {
            name: Some("x".into()),
            description: None,
            format: None,
        }
    )
    .await
    .unwrap()
    .is_none());
    assert!(!DatasetRepo::delete(&pool, 999).await.unwrap());
    assert!(ImageRepo::delete(&pool, 999).await.unwrap().is_none());
    assert!(!AnnotationRepo::delete(&pool, 999).await.unwrap());
    assert!(!ObjectClassRepo::delete(&pool, 999).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updating_missing_image_is_none_even_with_bad_dataset(pool: PgPool) {
    let result = ImageRepo::update(
        &pool,
        999,
        &UpdateImage {
            name: Some("renamed.png".into()),
            dataset_id: Some(12345),
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_image_to_missing_dataset_fails_validation(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let result = ImageRepo::update(
        &pool,
        image.id,
        &UpdateImage {
            name: None,
            dataset_id: Some(12345),
        },
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
    let image = ImageRepo::find_by_id(&pool, image.id).await.unwrap().unwrap();
    assert_eq!(image.dataset_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_dataset_keeps_images(pool: PgPool) {
    let dataset = DatasetRepo::create(&pool, &new_dataset("ds")).await.unwrap();
    let image = insert_image(&pool, "a.png", Some(dataset.id)).await;

    DatasetRepo::delete(&pool, dataset.id).await.unwrap();

    let image = ImageRepo::find_by_id(&pool, image.id).await.unwrap().unwrap();
    assert_eq!(image.dataset_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn image_insert_rejects_missing_dataset(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let result = ImageRepo::insert(
        &mut tx,
        &NewImage {
            name: "orphan.png".into(),
            width: 10,
            height: 10,
            format: "png".into(),
            size: 1,
            dataset_id: Some(12345),
        },
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn attach_detach_and_stats(pool: PgPool) {
    let dataset = DatasetRepo::create(&pool, &new_dataset("ds")).await.unwrap();
    let other = DatasetRepo::create(&pool, &new_dataset("other")).await.unwrap();
    let a = insert_image(&pool, "a.png", None).await;
    let b = insert_image(&pool, "b.png", None).await;
    let c = insert_image(&pool, "c.png", Some(other.id)).await;

    let moved = ImageRepo::attach_to_dataset(&pool, dataset.id, &[a.id, b.id, 9999])
        .await
        .unwrap();
    assert_eq!(moved, 2);

    let class = ObjectClassRepo::create(&pool, &new_class("car")).await.unwrap();
    AnnotationRepo::create(&pool, &new_annotation(a.id, class.id))
        .await
        .unwrap();

    let stats = DatasetRepo::stats(&pool, dataset.id).await.unwrap().unwrap();
    assert_eq!(stats.images_count, 2);
    assert_eq!(stats.labeled_images_count, 1);

    // `c` belongs to another dataset and is not detached.
    let detached = ImageRepo::detach_from_dataset(&pool, dataset.id, &[b.id, c.id])
        .await
        .unwrap();
    assert_eq!(detached, 1);

    let filter = ImageFilter {
        dataset_id: Some(dataset.id),
        ..Default::default()
    };
    let images = ImageRepo::list(&pool, &filter).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].id, a.id);
    assert!(DatasetRepo::stats(&pool, 999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_class_name_violates_unique_constraint(pool: PgPool) {
    ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();
    let err = ObjectClassRepo::create(&pool, &new_class("person"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_object_classes_name"));
    assert_eq!(ObjectClassRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn renaming_class_onto_existing_name_fails(pool: PgPool) {
    ObjectClassRepo::create(&pool, &new_class("cat")).await.unwrap();
    let dog = ObjectClassRepo::create(&pool, &new_class("dog")).await.unwrap();
    let err = ObjectClassRepo::update(
        &pool,
        dog.id,
        &UpdateObjectClass {
            name: Some("cat".into()),
            color: None,
            description: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23505")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn class_in_use_cannot_be_deleted(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("bike")).await.unwrap();
    AnnotationRepo::create(&pool, &new_annotation(image.id, class.id))
        .await
        .unwrap();

    let err = ObjectClassRepo::delete(&pool, class.id).await.unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23503")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_or_create_reuses_existing_class(pool: PgPool) {
    let existing = ObjectClassRepo::create(&pool, &new_class("truck")).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();

    let id = ObjectClassRepo::find_or_create_by_name(&mut conn, "truck", "#00ff00")
        .await
        .unwrap();
    assert_eq!(id, existing.id);

    let fresh = ObjectClassRepo::find_or_create_by_name(&mut conn, "bus", "#0000ff")
        .await
        .unwrap();
    let bus = ObjectClassRepo::find_by_id(&pool, fresh).await.unwrap().unwrap();
    assert_eq!(bus.color, "#0000ff");
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn annotation_lifecycle_tracks_is_labeled(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();
    assert!(!is_labeled(&pool, image.id).await);

    let first = AnnotationRepo::create(&pool, &new_annotation(image.id, class.id))
        .await
        .unwrap();
    assert_eq!(first.format, "bbox");
    assert!(is_labeled(&pool, image.id).await);

    let second = AnnotationRepo::create(&pool, &new_annotation(image.id, class.id))
        .await
        .unwrap();

    // Deleting a non-last annotation leaves the flag set.
    assert!(AnnotationRepo::delete(&pool, first.id).await.unwrap());
    assert!(is_labeled(&pool, image.id).await);

    // Deleting the last one clears it.
    assert!(AnnotationRepo::delete(&pool, second.id).await.unwrap());
    assert!(!is_labeled(&pool, image.id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn annotation_with_missing_parent_persists_nothing(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();

    let missing_image = AnnotationRepo::create(&pool, &new_annotation(4242, class.id)).await;
    assert_matches!(missing_image, Err(DbError::Core(CoreError::Validation(_))));

    let missing_class = AnnotationRepo::create(&pool, &new_annotation(image.id, 4242)).await;
    assert_matches!(missing_class, Err(DbError::Core(CoreError::Validation(_))));

    assert_eq!(annotation_count(&pool).await, 0);
    assert!(!is_labeled(&pool, image.id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_create_is_all_or_nothing(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();

    let batch = vec![
        new_annotation(image.id, class.id),
        new_annotation(image.id, 777),
    ];
    let result = AnnotationRepo::create_many(&pool, &batch).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(msg))) if msg.contains("annotations[1]"));
    assert_eq!(annotation_count(&pool).await, 0);

    let batch = vec![
        new_annotation(image.id, class.id),
        new_annotation(image.id, class.id),
    ];
    let created = AnnotationRepo::create_many(&pool, &batch).await.unwrap();
    assert_eq!(created.len(), 2);
    assert!(is_labeled(&pool, image.id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn moving_annotation_refreshes_both_images(pool: PgPool) {
    let from = insert_image(&pool, "from.png", None).await;
    let to = insert_image(&pool, "to.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();
    let annotation = AnnotationRepo::create(&pool, &new_annotation(from.id, class.id))
        .await
        .unwrap();

    let polygon = Geometry::Polygon {
        points: vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 4.0, y: 0.0 },
            Point { x: 4.0, y: 4.0 },
        ],
    };
    let updated = AnnotationRepo::update(
        &pool,
        annotation.id,
        &UpdateAnnotation {
            image_id: Some(to.id),
            class_id: None,
            geometry: Some(polygon),
            confidence: Some(0.5),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.format, "polygon");
    assert_eq!(updated.confidence, Some(0.5));
    assert!(!is_labeled(&pool, from.id).await);
    assert!(is_labeled(&pool, to.id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_image_cascades_to_annotations(pool: PgPool) {
    let image = insert_image(&pool, "a.png", None).await;
    let class = ObjectClassRepo::create(&pool, &new_class("person")).await.unwrap();
    AnnotationRepo::create(&pool, &new_annotation(image.id, class.id))
        .await
        .unwrap();

    let removed = ImageRepo::delete(&pool, image.id).await.unwrap().unwrap();
    assert_eq!(removed.path, format!("image_{}.png", image.id));
    assert_eq!(annotation_count(&pool).await, 0);
}

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::image;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// Uploads larger than `max_upload_bytes` are rejected with 413.
///
/// ```text
/// GET    /                    list (?skip, ?limit, ?dataset_id, ?is_labeled)
/// POST   /                    upload (multipart: file, dataset_id?)
/// GET    /{id}                get_by_id
/// PUT    /{id}                update
/// DELETE /{id}                delete
/// GET    /{id}/url            download_url
/// GET    /{id}/annotations    annotations
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(image::list)
                .post(image::upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/{id}",
            get(image::get_by_id)
                .put(image::update)
                .delete(image::delete),
        )
        .route("/{id}/url", get(image::download_url))
        .route("/{id}/annotations", get(image::annotations))
}

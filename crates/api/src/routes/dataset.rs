use axum::routing::get;
use axum::Router;

use crate::handlers::dataset;
use crate::state::AppState;

/// Routes mounted at `/datasets`.
///
/// ```text
/// GET    /                  list (?skip, ?limit)
/// POST   /                  create
/// GET    /{id}              get_by_id
/// PUT    /{id}              update
/// DELETE /{id}              delete
/// GET    /{id}/stats        stats
/// GET    /{id}/images       list_images (?skip, ?limit)
/// POST   /{id}/images       attach_images
/// DELETE /{id}/images       detach_images
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dataset::list).post(dataset::create))
        .route(
            "/{id}",
            get(dataset::get_by_id)
                .put(dataset::update)
                .delete(dataset::delete),
        )
        .route("/{id}/stats", get(dataset::stats))
        .route(
            "/{id}/images",
            get(dataset::list_images)
                .post(dataset::attach_images)
                .delete(dataset::detach_images),
        )
}

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::model;
use crate::state::AppState;

/// Routes mounted at `/models`.
///
/// ```text
/// GET    /                list
/// POST   /                create
/// GET    /{id}            get_by_id
/// PUT    /{id}            update
/// DELETE /{id}            delete
/// GET    /{id}/download   download_url
/// GET    /{id}/metrics    metrics
/// POST   /{id}/export     export (202, queues a job)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(model::list).post(model::create))
        .route(
            "/{id}",
            get(model::get_by_id)
                .put(model::update)
                .delete(model::delete),
        )
        .route("/{id}/download", get(model::download_url))
        .route("/{id}/metrics", get(model::metrics))
        .route("/{id}/export", post(model::export))
}

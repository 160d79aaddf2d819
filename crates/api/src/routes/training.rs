use axum::routing::get;
use axum::Router;

use crate::handlers::training;
use crate::state::AppState;

/// Routes mounted at `/trainings`.
///
/// ```text
/// GET    /                list (?skip, ?limit, ?model_id, ?dataset_id, ?status)
/// POST   /                create
/// GET    /{id}            get_by_id
/// DELETE /{id}            delete
/// GET    /{id}/metrics    metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(training::list).post(training::create))
        .route("/{id}", get(training::get_by_id).delete(training::delete))
        .route("/{id}/metrics", get(training::metrics))
}

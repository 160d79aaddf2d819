use axum::routing::get;
use axum::Router;

use crate::handlers::detection;
use crate::state::AppState;

/// Routes mounted at `/detections`.
///
/// ```text
/// GET    /                list (?skip, ?limit, ?image_id, ?model_id, ?status)
/// POST   /                create
/// GET    /{id}            get_by_id
/// DELETE /{id}            delete
/// GET    /{id}/results    results
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(detection::list).post(detection::create))
        .route("/{id}", get(detection::get_by_id).delete(detection::delete))
        .route("/{id}/results", get(detection::results))
}

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::annotation;
use crate::state::AppState;

/// Routes mounted at `/annotations`.
///
/// ```text
/// GET    /          list (?skip, ?limit, ?image_id, ?class_id)
/// POST   /          create
/// POST   /bulk      create_bulk
/// GET    /{id}      get_by_id
/// PUT    /{id}      update
/// DELETE /{id}      delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(annotation::list).post(annotation::create))
        .route("/bulk", post(annotation::create_bulk))
        .route(
            "/{id}",
            get(annotation::get_by_id)
                .put(annotation::update)
                .delete(annotation::delete),
        )
}

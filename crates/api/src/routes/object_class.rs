use axum::routing::get;
use axum::Router;

use crate::handlers::object_class;
use crate::state::AppState;

/// Routes mounted at `/classes`.
///
/// ```text
/// GET    /          list
/// POST   /          create
/// GET    /{id}      get_by_id
/// PUT    /{id}      update
/// DELETE /{id}      delete (409 while annotations use the class)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(object_class::list).post(object_class::create))
        .route(
            "/{id}",
            get(object_class::get_by_id)
                .put(object_class::update)
                .delete(object_class::delete),
        )
}

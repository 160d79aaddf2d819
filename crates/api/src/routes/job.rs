use axum::routing::get;
use axum::Router;

use crate::handlers::job;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{task_id}", get(job::get_by_task_id))
}

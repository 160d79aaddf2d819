use axum::routing::post;
use axum::Router;

use crate::handlers::status;
use crate::state::AppState;

/// Routes mounted at `/status`.
pub fn router() -> Router<AppState> {
    Router::new().route("/broadcast", post(status::broadcast))
}

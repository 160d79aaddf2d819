use axum::extract::State;
use axum::Json;
use labelforge_events::StatusUpdate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ws::BroadcastReport;

/// POST /api/v1/status/broadcast
///
/// Sends `{task_id, status, data?}` to every open status connection of
/// this process.
pub async fn broadcast(
    State(state): State<AppState>,
    AppJson(update): AppJson<StatusUpdate>,
) -> AppResult<Json<ApiResponse<BroadcastReport>>> {
    let report = state.hub.broadcast(&update).await;
    tracing::info!(
        task_id = %update.task_id,
        status = %update.status,
        delivered = report.delivered,
        dropped = report.dropped,
        "Status broadcast"
    );
    Ok(Json(ApiResponse::ok("Status broadcast", report)))
}

pub mod annotation;
pub mod dataset;
pub mod detection;
pub mod health;
pub mod image;
pub mod job;
pub mod model;
pub mod object_class;
pub mod status;
pub mod training;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws/status                       WebSocket status channel
///
/// /datasets                        list, create
/// /datasets/{id}                   get, update, delete
/// /datasets/{id}/stats             image counts
/// /datasets/{id}/images            list, attach (POST), detach (DELETE)
///
/// /images                          list, upload (multipart)
/// /images/{id}                     get, update, delete
/// /images/{id}/url                 presigned download URL
/// /images/{id}/annotations         annotations of the image
///
/// /classes                         list, create
/// /classes/{id}                    get, update, delete
///
/// /annotations                     list, create
/// /annotations/bulk                create many (POST)
/// /annotations/{id}                get, update, delete
///
/// /models                          list, create
/// /models/{id}                     get, update, delete
/// /models/{id}/download            presigned URL of the trained weights
/// /models/{id}/metrics             training metrics
/// /models/{id}/export              queue an export job (POST)
///
/// /trainings                       list, create (queues a train job)
/// /trainings/{id}                  get, delete (cancel)
/// /trainings/{id}/metrics          results once completed
///
/// /detections                      list, create (queues a detect job)
/// /detections/{id}                 get, delete
/// /detections/{id}/results         per-object result rows
///
/// /jobs/{task_id}                  job record by task handle
///
/// /status/broadcast                push a status update (POST)
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/ws/status", get(ws::ws_handler))
        .nest("/datasets", dataset::router())
        .nest("/images", image::router(max_upload_bytes))
        .nest("/classes", object_class::router())
        .nest("/annotations", annotation::router())
        .nest("/models", model::router())
        .nest("/trainings", training::router())
        .nest("/detections", detection::router())
        .nest("/jobs", job::router())
        .nest("/status", status::router())
}

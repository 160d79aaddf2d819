//! One processor per [`JobKind`]. Each takes a claimed job and returns the
//! JSON result stored on the job row, or the error that fails it.
//!
//! A job whose entity has already left the `created` state is a
//! redelivery; it is completed with `{"skipped": true}` and the entity is
//! left alone.

pub mod detection;
pub mod export;
pub mod training;

use labelforge_core::jobs::JobKind;
use labelforge_db::models::job::Job;
use serde_json::{json, Value};

use crate::context::WorkerContext;
use crate::error::WorkerError;

/// Run the processor for `job`'s kind.
pub async fn dispatch(ctx: &WorkerContext, job: &Job) -> Result<Value, WorkerError> {
    match job.kind()? {
        JobKind::Train => training::process(ctx, job).await,
        JobKind::Detect => detection::process(ctx, job).await,
        JobKind::Export => export::process(ctx, job).await,
    }
}

/// Result recorded for a redelivered job.
pub(crate) fn skipped(status: &str) -> Value {
    json!({ "skipped": true, "entity_status": status })
}

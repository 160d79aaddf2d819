//! Success envelope shared by every API handler.
//!
//! Successful responses are `{ "success": true, "message", "data" }`, plus
//! `total` on list endpoints. Failures are rendered by
//! [`AppError`](crate::error::AppError).

use serde::Serialize;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            total: None,
        }
    }

    /// A page of a list together with the unpaginated match count.
    pub fn page(message: impl Into<String>, data: T, total: i64) -> Self {
        Self {
            total: Some(total),
            ..Self::ok(message, data)
        }
    }
}

/// Body of delete responses.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: labelforge_core::types::DbId,
}

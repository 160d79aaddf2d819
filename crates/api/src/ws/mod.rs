//! WebSocket status channel.
//!
//! Provides the connection registry with per-peer bounded queues, the
//! heartbeat task, and the HTTP upgrade handler.

mod handler;
mod heartbeat;
pub mod hub;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use hub::{BroadcastReport, StatusHub};

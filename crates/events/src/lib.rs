//! Job status events.
//!
//! - [`StatusUpdate`]: the message pushed to status-channel clients.
//! - [`EventBus`]: in-process fan-out backed by `tokio::sync::broadcast`.
//! - [`notify`]: cross-process delivery over Postgres `NOTIFY`, used by
//!   workers to reach the API process.

pub mod bus;
pub mod notify;

pub use bus::{EventBus, StatusUpdate};
pub use notify::{publish_status, StatusListener, STATUS_CHANNEL};

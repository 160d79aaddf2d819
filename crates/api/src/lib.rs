//! LabelForge API server library.
//!
//! Exposes configuration, state, error handling, routes and the WebSocket
//! status hub so integration tests and the binary entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod ws;

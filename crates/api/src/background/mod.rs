//! Long-running tasks spawned by the API binary.

pub mod status_relay;

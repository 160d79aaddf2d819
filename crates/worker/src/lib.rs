//! Background worker: promotes outbox entries to the job queue and runs
//! queued training, detection and export jobs.

pub mod config;
pub mod context;
pub mod error;
pub mod processors;
pub mod relay;
pub mod retention;
pub mod runner;

pub use config::WorkerConfig;
pub use context::WorkerContext;
pub use error::WorkerError;
pub use relay::OutboxRelay;
pub use retention::JobRetention;
pub use runner::JobRunner;

use std::time::Duration;

/// Default retention for finished jobs: one week.
const DEFAULT_RETENTION_HOURS: u64 = 168;

/// Worker loop settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Idle wait between queue polls.
    pub poll_interval: Duration,
    /// Maximum outbox entries promoted per relay pass.
    pub relay_batch_size: i64,
    /// Interval between relay passes.
    pub relay_interval: Duration,
    /// How long finished jobs and relayed outbox entries are kept. `None`
    /// disables pruning.
    pub job_retention: Option<Duration>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            relay_batch_size: 100,
            relay_interval: Duration::from_millis(250),
            job_retention: Some(Duration::from_secs(DEFAULT_RETENTION_HOURS * 3600)),
        }
    }
}

impl WorkerConfig {
    /// | Env var                   | Default |
    /// |---------------------------|---------|
    /// | `WORKER_POLL_INTERVAL_MS` | `500`   |
    /// | `RELAY_BATCH_SIZE`        | `100`   |
    /// | `RELAY_INTERVAL_MS`       | `250`   |
    /// | `JOB_RETENTION_HOURS`     | `168`   |
    ///
    /// `JOB_RETENTION_HOURS=0` keeps job history forever.
    pub fn from_env() -> Self {
        let poll_ms: u64 = std::env::var("WORKER_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("WORKER_POLL_INTERVAL_MS must be a valid u64");

        let relay_batch_size: i64 = std::env::var("RELAY_BATCH_SIZE")
            .unwrap_or_else(|_| "100".into())
            .parse()
            .expect("RELAY_BATCH_SIZE must be a valid i64");
        assert!(relay_batch_size > 0, "RELAY_BATCH_SIZE must be positive");

        let relay_ms: u64 = std::env::var("RELAY_INTERVAL_MS")
            .unwrap_or_else(|_| "250".into())
            .parse()
            .expect("RELAY_INTERVAL_MS must be a valid u64");

        let retention_hours: u64 = std::env::var("JOB_RETENTION_HOURS")
            .unwrap_or_else(|_| DEFAULT_RETENTION_HOURS.to_string())
            .parse()
            .expect("JOB_RETENTION_HOURS must be a valid u64");

        Self {
            poll_interval: Duration::from_millis(poll_ms),
            relay_batch_size,
            relay_interval: Duration::from_millis(relay_ms),
            job_retention: (retention_hours > 0)
                .then(|| Duration::from_secs(retention_hours * 3600)),
        }
    }
}

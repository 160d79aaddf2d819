use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labelforge_pipeline::{FixtureTrainer, ModelExporter, PipelineConfig};
use labelforge_storage::{Bucket, S3Storage, SharedStore, StorageConfig};
use labelforge_worker::{JobRetention, JobRunner, OutboxRelay, WorkerConfig, WorkerContext};

/// How long to wait for the loops to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labelforge_worker=debug,labelforge_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let worker_config = WorkerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    let storage_config = StorageConfig::from_env();
    tracing::info!(
        detector = ?pipeline_config.detector_backend,
        poll_interval_ms = worker_config.poll_interval.as_millis() as u64,
        "Loaded worker configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = labelforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    labelforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database connection pool created");

    // --- Object storage ---
    let store: SharedStore = Arc::new(S3Storage::connect(&storage_config).await);
    for bucket in Bucket::ALL {
        store
            .ensure_bucket(bucket)
            .await
            .expect("Failed to ensure storage bucket");
    }
    tracing::info!(endpoint = %storage_config.endpoint, "Object storage ready");

    // --- Pipeline ---
    let detector = labelforge_pipeline::build_detector(&pipeline_config, Arc::clone(&store))
        .expect("Invalid detector configuration");
    let ctx = WorkerContext {
        pool: pool.clone(),
        trainer: Arc::new(FixtureTrainer::new(Arc::clone(&store))),
        detector,
        exporter: Arc::new(ModelExporter::new(Arc::clone(&store))),
        pipeline: pipeline_config,
    };

    // --- Loops ---
    let cancel = CancellationToken::new();
    let relay_handle = tokio::spawn(OutboxRelay::run(
        pool.clone(),
        worker_config.clone(),
        cancel.clone(),
    ));
    let retention_handle = worker_config
        .job_retention
        .map(|retention| tokio::spawn(JobRetention::run(pool.clone(), retention, cancel.clone())));
    let runner_handle = tokio::spawn(JobRunner::new(ctx, worker_config).run(cancel.clone()));
    tracing::info!("Worker started");

    shutdown_signal().await;
    cancel.cancel();

    let joined = tokio::time::timeout(SHUTDOWN_GRACE, async {
        let _ = relay_handle.await;
        let _ = runner_handle.await;
        if let Some(handle) = retention_handle {
            let _ = handle.await;
        }
    })
    .await;
    if joined.is_err() {
        tracing::warn!("Worker loops did not stop within the grace period");
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

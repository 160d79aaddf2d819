use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labelforge_api::config::ServerConfig;
use labelforge_api::router::build_app_router;
use labelforge_api::state::AppState;
use labelforge_api::{background, ws};
use labelforge_events::{EventBus, StatusListener};
use labelforge_pipeline::PipelineConfig;
use labelforge_storage::{Bucket, S3Storage, SharedStore, StorageConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labelforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    let storage_config = StorageConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = labelforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    labelforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    labelforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let store: SharedStore = Arc::new(S3Storage::connect(&storage_config).await);
    for bucket in Bucket::ALL {
        store
            .ensure_bucket(bucket)
            .await
            .expect("Failed to ensure storage bucket");
    }
    tracing::info!(endpoint = %storage_config.endpoint, "Object storage ready");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    // --- Status hub ---
    let hub = Arc::new(ws::StatusHub::new(config.status_queue_capacity));
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&hub));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();

    // Forward worker notifications from Postgres onto the bus, then from
    // the bus to every open status connection.
    let relay_handle = tokio::spawn(background::status_relay::run(
        event_bus.subscribe(),
        Arc::clone(&hub),
        cancel.clone(),
    ));
    let listener_handle = tokio::spawn(StatusListener::run(
        pool.clone(),
        Arc::clone(&event_bus),
        cancel.clone(),
    ));
    tracing::info!("Status services started (listener, relay, heartbeat)");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        store,
        hub: Arc::clone(&hub),
        pipeline: Arc::new(pipeline_config),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    let _ = tokio::time::timeout(grace, listener_handle).await;
    let _ = tokio::time::timeout(grace, relay_handle).await;
    tracing::info!("Status services shut down");

    let ws_count = hub.connection_count().await;
    tracing::info!(ws_count, "Closing remaining status connections");
    hub.shutdown_all().await;

    heartbeat_handle.abort();
    pool.close().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
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

//! Lectern Server
//!
//! Course content delivery backend with native S3 support: chunked
//! multipart uploads go straight from the client to object storage over
//! presigned URLs, and playback is served back with full HTTP range
//! support.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod catalog;
mod config;
mod error;
mod routes;
mod state;
mod storage;
mod stream;
mod upload;

use axum::Router;
use catalog::SqliteCatalog;
use config::Config;
use state::AppState;
use storage::S3Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Lectern Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("S3 endpoint: {}", config.storage.endpoint);
    tracing::info!("S3 bucket: {}", config.storage.bucket);
    tracing::info!(
        "SDK operation timeout: {}h, part URL expiry: {}s",
        config.storage.operation_timeout_hours,
        config.upload.part_url_expiry_secs
    );

    // Initialize S3 client
    let s3_client = S3Client::new(&config.storage)
        .await
        .context("Failed to initialize S3 client")?;

    // Initialize catalog database
    let db_pool = catalog::create_pool(&config.database.url)
        .await
        .context("Failed to initialize catalog database")?;
    tracing::info!("Catalog database initialized at {}", config.database.url);

    let catalog = Arc::new(SqliteCatalog::new(db_pool));
    let app_state = AppState::new(config.clone(), s3_client, catalog);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/multipart", routes::multipart::router())
        .nest("/stream", routes::stream::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Lectern Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

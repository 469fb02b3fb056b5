//! Campus Lost & Found - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin lost-found-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin lost-found-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_LOG_JSON` - Emit JSON log lines (default: false)
//! * `API_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! * `API_NOTIFICATION_RETENTION_DAYS` - Age at which read notifications are purged (default: 180)
//! * `API_IDEMPOTENCY_TTL_HOURS` - Lifetime of idempotency records (default: 24)

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router, sweep_retention, AppState, Ports};
use infra_db::{create_pool, run_migrations, DatabaseConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Failed to load API configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Campus Lost & Found API Server"
    );

    let pool = create_pool(
        DatabaseConfig::new(config.database_url.clone()).max_connections(config.db_max_connections),
    )
    .await
    .context("Failed to connect to database")?;

    run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let ports = Ports::postgres(pool);
    sweep_retention(&ports, &config).await;

    let app = create_router(AppState::new(ports, config.clone()));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over `log_level`
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

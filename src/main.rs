//! Chango payroll server.
//!
//! Loads the payroll configuration, opens the SQLite store and serves the
//! attendance, employee and receipt API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chango_payroll::api::{AppState, create_router};
use chango_payroll::config::ConfigLoader;
use chango_payroll::store;

/// Command-line arguments for the payroll server
#[derive(Parser, Debug)]
#[command(name = "chango-payroll")]
#[command(about = "Time-tracking and payroll receipt server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "CHANGO_PORT")]
    port: u16,

    /// SQLite database URL
    #[arg(long, default_value = "sqlite://chango.db", env = "CHANGO_DATABASE_URL")]
    database_url: String,

    /// Directory holding company.yaml, rates.yaml and overtime.yaml
    #[arg(short, long, default_value = "config/chango", env = "CHANGO_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Maximum number of pooled database connections
    #[arg(long, default_value = "8", env = "CHANGO_MAX_CONNECTIONS")]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chango_payroll=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!(
        "Starting Chango payroll v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        args.port
    );

    let config = ConfigLoader::load(&args.config_dir).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            args.config_dir.display()
        )
    })?;
    info!(
        company = %config.company().name,
        currency = %config.company().currency,
        roles = config.config().rates().roles.len(),
        "Configuration loaded"
    );

    let pool = store::open_pool(&args.database_url, args.max_connections)
        .await
        .context("Failed to open database")?;

    let app = create_router(AppState::new(pool.clone(), config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

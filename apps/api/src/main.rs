//! Emporium API server entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use emporium_api::{init_tracing, router, ApiConfig, AppState};
use emporium_db::Database;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "emporium-api", version, about = "Emporium HTTP API server")]
struct Args {
    /// Path to a TOML config file (default: ./emporium.toml if present)
    #[arg(short, long, env = "EMPORIUM_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = ApiConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.log_filter);

    info!("Starting Emporium API server...");
    info!(
        database = %config.database.path.display(),
        token_lifetime_secs = config.security.token_lifetime_secs,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let (total, applied) = db.migration_status().await?;
    info!(applied, total, "Database schema ready");

    let state = AppState::new(db.clone(), &config.security);
    let app = router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

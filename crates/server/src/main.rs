mod app_state;
mod config;
mod db;
mod errors;
mod handlers;
mod logging;
mod models;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use config::{ConfigError, ServerConfig};
use tokio::signal::{self, ctrl_c};
use visit_ledger_core::app::ledger::VisitLedger;

use crate::app_state::AppState;

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    let config_path = std::env::var("SERVER_CONFIG_PATH")
        .unwrap_or_else(|_| "crates/server/res/config.toml".to_string());

    let config = ServerConfig::load(Path::new(&config_path)).await?;
    logging::init_tracing(&config)?;

    let dialect = config.dialect()?;
    tracing::info!(?dialect, "store dialect configured");
    tracing::info!(
        validate_phone = config.ledger.validate_phone,
        cycle_length = config.ledger.cycle_length,
        track_name = config.ledger.track_name,
        "ledger policy"
    );
    tracing::info!(host = %config.http.host, port = config.http.port, "server http bind");

    let store = db::connect_store(&config, Path::new(&config_path)).await?;
    let ledger = VisitLedger::new(store, config.ledger.clone());
    let state = AppState {
        ledger: Arc::new(ledger),
    };

    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("invalid http bind: {e}")))?;

    let app = handlers::router(state, &config.cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ConfigError::Invalid(format!("http server error: {e}")))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::warn!(error = %e, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!(error = %e, "terminate handler unavailable");
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
}

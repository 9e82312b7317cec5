//! slotwise server — application entry point.
//!
//! Reads configuration from the environment (`DATABASE_URL`, `PORT`,
//! `LOG_LEVEL`, `RECURRENCE_EXPANSION_DAYS`), connects the pool, applies
//! the schema, and serves the booking API until ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slotwise_service::ServiceConfig;

mod config;
mod error;
mod handlers;
mod payload;
mod routes;

use config::ServerConfig;
use handlers::AppState;

#[derive(Parser)]
#[command(name = "slotwise", version, about = "Resource reservation service")]
struct Cli {
    /// Listen port (overrides the PORT environment variable)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut server_config = ServerConfig::from_env()?;
    if let Some(port) = cli.port {
        server_config.port = port;
    }

    let pool = slotwise_store::connect(&server_config.database_url).await?;
    slotwise_store::run_migrations(&pool).await?;

    let state = Arc::new(AppState {
        pool: pool.clone(),
        config: ServiceConfig::from_env(),
        shutdown: CancellationToken::new(),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listen socket")?;
    info!(%addr, "slotwise listening");

    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            shutdown.cancel();
        }
    });

    axum::serve(listener, routes::router(state.clone()))
        .with_graceful_shutdown(state.shutdown.clone().cancelled_owned())
        .await?;

    pool.close().await;
    info!("slotwise stopped");
    Ok(())
}

//! Company Profile Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use company_profile_aggregator::aggregator::Aggregator;
use company_profile_aggregator::api::{create_router, AppState};
use company_profile_aggregator::config::AppConfig;
use company_profile_aggregator::metrics::Metrics;

const DEFAULT_PORT: u16 = 8000;
const FALLBACK_PORT: u16 = 8080;

/// Primary port: `$PORT` when set and parseable, 8000 otherwise.
fn primary_port(env_port: Option<String>) -> u16 {
    env_port
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("company_profile_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Bind the primary port, falling back once when it is already taken.
async fn bind_listener() -> anyhow::Result<tokio::net::TcpListener> {
    let port = primary_port(std::env::var("PORT").ok());
    let primary = SocketAddr::from(([0, 0, 0, 0], port));
    match tokio::net::TcpListener::bind(primary).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            tracing::warn!(port, "port in use, trying fallback");
            let fallback = SocketAddr::from(([0, 0, 0, 0], FALLBACK_PORT));
            Ok(tokio::net::TcpListener::bind(fallback).await?)
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load();
    let metrics = Metrics::init()?;
    let aggregator = Aggregator::new(&cfg)?;

    let router = create_router(AppState::new(aggregator)).merge(metrics.router());

    let listener = bind_listener().await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

//! `ach-cli serve`: health endpoint only, no queue processing. Useful for a
//! sidecar health-check process separate from the worker, or for smoke-testing
//! deployment wiring before the worker is armed.

use ach_config::WorkerConfig;
use ach_daemon::{routes, state};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

pub async fn serve() -> Result<()> {
    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    let pool = ach_db::connect(&config.database_url).await?;
    let shared = Arc::new(state::AppState::new(pool));

    let app = routes::build_router(Arc::clone(&shared)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    info!("ach-cli serve listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("health server crashed")?;

    Ok(())
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("ACH_DAEMON_ADDR").ok()?.parse().ok()
}

//! ach-daemon entry point.
//!
//! Intentionally thin: load config, connect, build shared state, wire
//! middleware, serve. The route handler lives in `routes.rs`; shared state
//! lives in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use ach_config::WorkerConfig;
use anyhow::Context;
use ach_daemon::{routes, state};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    let pool = ach_db::connect(&config.database_url).await?;

    let shared = Arc::new(state::AppState::new(pool));

    let app = routes::build_router(Arc::clone(&shared)).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));
    info!("ach-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("ACH_DAEMON_ADDR").ok()?.parse().ok()
}

//! `ach-cli run`: the worker process. Builds the pool, the object store, and
//! the Supervisor, then blocks until SIGINT/SIGTERM flips the cancellation
//! flag the Supervisor checks between iterations.

use ach_config::WorkerConfig;
use ach_runtime::Supervisor;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

use super::object_store_from_config;

pub async fn run() -> Result<()> {
    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    let pool = ach_db::connect(&config.database_url).await?;
    let object_store = object_store_from_config(&config);

    let supervisor = Supervisor::new(pool, object_store, config);
    let cancel = Arc::new(AtomicBool::new(false));

    spawn_shutdown_listener(Arc::clone(&cancel));

    info!("worker starting");
    supervisor.run(cancel).await?;
    info!("worker stopped");

    Ok(())
}

/// Flip `cancel` on Ctrl-C or SIGTERM. The Supervisor finishes its current
/// iteration before observing the flag, so no in-flight event is interrupted.
fn spawn_shutdown_listener(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    cancel.store(true, Ordering::SeqCst);
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        info!("shutdown signal received, draining current iteration");
        cancel.store(true, Ordering::SeqCst);
    });
}

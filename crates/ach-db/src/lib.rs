//! Postgres-backed persistence for the achievements worker: the event
//! queue, player counters, rule registry, and award ledger.

mod awards;
mod counters;
mod events;
mod queue;
mod rules;

pub use awards::{attach_asset_url, fetch_award, insert_award, InsertAwardArgs};
pub use counters::{apply_game_stats, fetch_counters, FetchedCounters};
pub use events::load_events;
pub use queue::{claim_batch, mark_done, mark_retry, queue_lag};
pub use rules::fetch_candidate_rules;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to Postgres with a process-scoped connection pool sized for a
/// single worker instance.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// Run embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple connectivity + schema-presence check used by `ach-cli db status`.
pub async fn status(pool: &PgPool) -> Result<()> {
    sqlx::query("select 1 from event_queue limit 1")
        .fetch_optional(pool)
        .await
        .context("status query failed")?;
    Ok(())
}

//! ach-cli: the achievements worker's deployable binary. Thin dispatch over
//! `commands/`; all real logic lives there.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ach")]
#[command(about = "Achievements worker CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply embedded database migrations.
    Migrate,
    /// Check database connectivity and schema presence.
    Status,
    /// Run the worker: claim, process, and retry queue items until signaled.
    Run,
    /// Serve the health endpoint only; no queue processing.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Migrate => {
            let database_url = require_database_url()?;
            commands::db::db_migrate(&database_url).await
        }
        Commands::Status => {
            let database_url = require_database_url()?;
            commands::db::db_status(&database_url).await
        }
        Commands::Run => commands::run::run().await,
        Commands::Serve => commands::serve::serve().await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// `migrate`/`status` only need the connection string, not the full
/// `WorkerConfig` (object-store/public-url vars aren't relevant to them).
fn require_database_url() -> Result<String> {
    std::env::var(ach_config::ENV_DATABASE_URL)
        .with_context(|| format!("missing required env var {}", ach_config::ENV_DATABASE_URL))
}

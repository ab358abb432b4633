//! `ach-cli db` subcommands.

use anyhow::Result;

pub async fn db_migrate(database_url: &str) -> Result<()> {
    let pool = ach_db::connect(database_url).await?;
    ach_db::migrate(&pool).await?;
    println!("migrations_applied=true");
    Ok(())
}

pub async fn db_status(database_url: &str) -> Result<()> {
    let pool = ach_db::connect(database_url).await?;
    match ach_db::status(&pool).await {
        Ok(()) => {
            println!("db_ok=true");
            Ok(())
        }
        Err(e) => {
            println!("db_ok=false");
            Err(e)
        }
    }
}

use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::OnceLock;

pub mod models;
pub mod repositories;
pub mod transaction;
pub mod utils;

pub use transaction::DatabaseTransaction;

static POOL: OnceLock<PgPool> = OnceLock::new();

pub async fn init_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    POOL.set(pool.clone())
        .map_err(|_| anyhow::anyhow!("Database pool already initialized"))?;

    Ok(pool)
}

/// Process-global pool handle used by the repository functions.
///
/// Panics if called before `init_database`; the server wires this up at startup
/// and tests that touch repositories must do the same.
pub fn pool() -> &'static PgPool {
    POOL.get().expect("database pool not initialized")
}

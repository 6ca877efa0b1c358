//! Persistence for WebDash.
//!
//! Postgres is the production backend: user records are rows whose
//! document-shaped parts (questionnaire answers, project phases, feedback)
//! live in JSONB columns. Handlers talk to a [`DocumentStore`] so the same
//! code runs against [`PgStore`] or the in-process [`MemoryStore`].

pub mod models;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

pub use store::memory::MemoryStore;
pub use store::postgres::PgStore;
pub use store::{DocumentStore, StoreError};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

//! # Database Pool
//!
//! The database is optional. When `DATABASE_URL` is set, document records
//! and accounts persist in PostgreSQL and the embedded migrations run at
//! startup. When it is absent, both live in memory.

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect and migrate.
///
/// Returns `None` when no URL is given. Returns `Err` when a URL is given
/// but the connection or a migration fails.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!("connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    Ok(Some(pool))
}

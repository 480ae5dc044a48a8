//! Session store migration.
//!
//! The storefront's only table is the tower-sessions `session` table in the
//! `tower_sessions` schema. The store creates both idempotently.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions_sqlx_store::PostgresStore;
use woo_headless_storefront::config::StorefrontConfig;

use super::CommandError;

/// Create the session schema and table.
///
/// # Errors
///
/// Returns an error when the URL is missing, the database is unreachable,
/// or the DDL fails.
pub async fn sessions() -> Result<(), CommandError> {
    let database_url = StorefrontConfig::database_url_from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating session store schema...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session store ready");
    Ok(())
}

//! Database pool initialization and the Postgres-backed repository.

mod postgres_repository;

pub use postgres_repository::create_postgres_repository;

use crate::config::DatabaseConfig;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Bootstrap schema, applied idempotently at startup.
///
/// `owner_user_id` is UNIQUE: the store itself enforces at most one
/// certificate per user. The FK cascade removes a user's certificate
/// when the account is deleted. `uploaded_by` is a plain column so the
/// record survives deletion of the uploading admin.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    national_id TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    email TEXT,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    certificate_id UUID,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS certificates (
    id UUID PRIMARY KEY,
    owner_user_id UUID NOT NULL UNIQUE REFERENCES users (id) ON DELETE CASCADE,
    file_name TEXT NOT NULL,
    payload BYTEA NOT NULL,
    mime_type TEXT NOT NULL,
    issued_at TIMESTAMPTZ NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL,
    status TEXT NOT NULL DEFAULT 'valid',
    uploaded_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
"#;

/// Connects to Postgres with bounded retries and applies the bootstrap
/// schema.
///
/// # Errors
/// Returns an error once `retry_count` connection attempts have failed,
/// or if schema application fails.
pub async fn init_database_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let connected = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match connected {
            Ok(pool) => {
                sqlx::raw_sql(SCHEMA).execute(&pool).await?;
                tracing::info!("database ready after {attempt} attempt(s)");
                return Ok(pool);
            }
            Err(err) if attempt < config.retry_count => {
                tracing::warn!("database connection attempt {attempt} failed: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

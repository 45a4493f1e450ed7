//! Bundled schema applied at startup.
//!
//! The service owns exactly one schema. It is embedded at compile time and
//! applied once before the pool is built; there is no migration CLI.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Schema migrations embedded from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying the bundled schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaBootstrapError {
    #[error("failed to connect for schema bootstrap: {message}")]
    Connect { message: String },
    #[error("failed to apply bundled schema: {message}")]
    Apply { message: String },
    #[error("schema bootstrap task did not complete: {message}")]
    Join { message: String },
}

/// Apply pending migrations on a blocking connection.
///
/// Returns the number of migrations applied.
///
/// # Errors
///
/// Returns [`SchemaBootstrapError`] when the database cannot be reached or a
/// migration fails.
pub fn apply_schema_blocking(database_url: &str) -> Result<usize, SchemaBootstrapError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| SchemaBootstrapError::Connect {
            message: err.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| SchemaBootstrapError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.len())
}

/// Apply pending migrations without blocking the async runtime.
///
/// # Errors
///
/// See [`apply_schema_blocking`]; a panicked worker thread maps to
/// [`SchemaBootstrapError::Join`].
pub async fn apply_schema(database_url: &str) -> Result<usize, SchemaBootstrapError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply_schema_blocking(&url))
        .await
        .map_err(|err| SchemaBootstrapError::Join {
            message: err.to_string(),
        })??;
    info!(applied, "inventory schema ready");
    Ok(applied)
}

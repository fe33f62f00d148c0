//! SQLite connection factory and migration runner for Lectern.
//!
//! The pool is created once by the process entry point and handed to the
//! repositories explicitly; nothing in here keeps global state.

use std::str::FromStr;

use lectern_kernel::settings::DatabaseSettings;
use lectern_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod migrate;

pub use migrate::run_migrations;

/// Errors raised while connecting to or preparing the database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("invalid database url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration bookkeeping failed: {0}")]
    Bookkeeping(#[source] sqlx::Error),
}

/// Open a connection pool for the configured database.
///
/// Foreign keys are enforced on every connection. An in-memory database lives
/// only as long as its connection, so the pool is pinned to one connection that
/// never idles out.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    if !settings.url.starts_with("sqlite:") {
        return Err(DbError::InvalidUrl {
            url: settings.url.clone(),
            reason: "expected a sqlite: url".to_string(),
        });
    }

    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|err| DbError::InvalidUrl {
            url: settings.url.clone(),
            reason: err.to_string(),
        })?
        .create_if_missing(settings.create_if_missing)
        .foreign_keys(true);

    let pool_options = if settings.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(DbError::Connect)?;

    tracing::info!(
        target: "lectern-db",
        url = %settings.url,
        in_memory = settings.is_in_memory(),
        "database pool ready"
    );

    Ok(pool)
}

/// Open a private in-memory database with the given migrations applied.
pub async fn connect_in_memory(migrations: &[(String, Migration)]) -> Result<SqlitePool, DbError> {
    let pool = connect(&DatabaseSettings::in_memory()).await?;
    run_migrations(&pool, migrations).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_enforces_foreign_keys() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn in_memory_pool_keeps_state_between_queries() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE shelf (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO shelf DEFAULT VALUES")
            .execute(&pool)
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shelf")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn invalid_url_is_reported() {
        let settings = DatabaseSettings {
            url: "postgres://localhost/catalog".to_string(),
            ..DatabaseSettings::default()
        };
        let err = connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl { .. }));
    }
}

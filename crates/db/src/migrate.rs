//! Applies module-contributed migrations and records them in `_lectern_migrations`.

use lectern_kernel::Migration;
use sqlx::SqlitePool;

use crate::DbError;

const BOOKKEEPING_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _lectern_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    );
"#;

/// Apply every pending migration, each in its own transaction.
///
/// Returns the number of migrations applied by this call; already applied
/// migrations are skipped.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> Result<usize, DbError> {
    sqlx::raw_sql(BOOKKEEPING_TABLE)
        .execute(pool)
        .await
        .map_err(DbError::Bookkeeping)?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM _lectern_migrations WHERE module = ? AND id = ?)",
        )
        .bind(module)
        .bind(migration.id)
        .fetch_one(pool)
        .await
        .map_err(DbError::Bookkeeping)?;

        if already_applied {
            tracing::debug!(target: "lectern-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let failed = |source| DbError::Migration {
            module: module.clone(),
            id: migration.id,
            source,
        };

        let mut tx = pool.begin().await.map_err(failed)?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        sqlx::query("INSERT INTO _lectern_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
        tx.commit().await.map_err(failed)?;

        tracing::info!(target: "lectern-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect;
    use lectern_kernel::settings::DatabaseSettings;

    fn shelf_migrations() -> Vec<(String, Migration)> {
        vec![
            (
                "shelf".to_string(),
                Migration {
                    id: "001_init",
                    up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY, label TEXT NOT NULL);",
                },
            ),
            (
                "shelf".to_string(),
                Migration {
                    id: "002_index",
                    up: "CREATE INDEX shelf_label_idx ON shelf (label);",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn rerunning_migrations_is_a_no_op() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();

        assert_eq!(run_migrations(&pool, &shelf_migrations()).await.unwrap(), 2);
        assert_eq!(run_migrations(&pool, &shelf_migrations()).await.unwrap(), 0);

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _lectern_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 2);
    }

    #[tokio::test]
    async fn failing_migration_is_rolled_back() {
        let pool = connect(&DatabaseSettings::in_memory()).await.unwrap();
        let broken = vec![(
            "shelf".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY); CREATE TABLE shelf (id INTEGER);",
            },
        )];

        let err = run_migrations(&pool, &broken).await.unwrap_err();
        assert!(matches!(err, DbError::Migration { id: "001_broken", .. }));

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'shelf'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 0);
    }
}

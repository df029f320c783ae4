//! SQLite connection pool factory and idempotent schema initialization.

use std::str::FromStr;

use anyhow::Context;
use catalog_kernel::settings::DatabaseSettings;
use catalog_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Handle to the durable store. Opened at startup and closed at shutdown.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for the configured database URL.
    ///
    /// File databases are created when missing. In-memory databases are
    /// pinned to a single connection, since every SQLite connection to
    /// `:memory:` would otherwise see its own empty database.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = is_in_memory(&settings.url);
        let max_connections = if in_memory {
            1
        } else {
            settings.max_connections.max(1)
        };

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            // Recycling the only connection would drop the database with it.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database '{}'", settings.url))?;

        tracing::info!(
            target: "catalog-db",
            url = %settings.url,
            max_connections,
            "database pool opened"
        );

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect(&DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
    }

    /// Apply every schema statement inside one transaction.
    ///
    /// Statements are expected to be idempotent, so this is safe to call on
    /// each startup.
    pub async fn initialize(&self, migrations: &[(String, Migration)]) -> anyhow::Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin schema transaction")?;

        for (module, migration) in migrations {
            tracing::info!(
                target: "catalog-db",
                module = %module,
                migration = migration.id,
                "applying schema"
            );
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .with_context(|| {
                    format!("schema '{}' of module '{}' failed", migration.id, module)
                })?;
        }

        tx.commit()
            .await
            .context("failed to commit schema transaction")?;

        Ok(())
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every connection, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "catalog-db", "database pool closed");
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<(String, Migration)> {
        vec![(
            "test".to_string(),
            Migration {
                id: "001_init",
                up: r#"
                    CREATE TABLE IF NOT EXISTS item (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        code TEXT NOT NULL
                    );
                    CREATE UNIQUE INDEX IF NOT EXISTS item_code_unique ON item (code);
                "#,
            },
        )]
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file?mode=memory"));
        assert!(!is_in_memory("sqlite://library.db"));
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let db = Database::in_memory().await.unwrap();

        db.initialize(&schema()).await.unwrap();
        db.initialize(&schema()).await.unwrap();

        sqlx::query("INSERT INTO item (code) VALUES ('a')")
            .execute(db.pool())
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM item")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        db.close().await;
    }

    #[tokio::test]
    async fn unique_index_is_enforced() {
        let db = Database::in_memory().await.unwrap();
        db.initialize(&schema()).await.unwrap();

        sqlx::query("INSERT INTO item (code) VALUES ('dup')")
            .execute(db.pool())
            .await
            .unwrap();
        let err = sqlx::query("INSERT INTO item (code) VALUES ('dup')")
            .execute(db.pool())
            .await
            .unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("expected database error, got {other:?}"),
        }
    }
}

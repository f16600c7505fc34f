use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Handle to the durable local store backing the queue and the mirror.
#[derive(Clone)]
pub struct ConnectionPool {
    pool: SqlitePool,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            // a write is on disk before the statement returns
            .synchronous(SqliteSynchronous::Full);

        if let Some(parent) = options.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|err| {
                AppError::Storage(format!(
                    "failed to create database directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::debug!(
            target: "offline::store",
            url = database_url,
            max_connections,
            "opened local store"
        );

        Ok(Self { pool })
    }

    /// Opens and migrates the store described by `config`.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = Self::new(&config.url, config.max_connections).await?;
        pool.migrate().await?;
        Ok(pool)
    }

    /// Single-connection in-memory store; the database lives as long as the pool.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let pool = Self { pool };
        pool.migrate().await?;
        Ok(pool)
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("offline.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let pool = ConnectionPool::new(&url, 2).await.unwrap();
        pool.migrate().await.unwrap();

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('queue_entries', 'mirror_records')",
        )
        .fetch_one(pool.get_pool())
        .await
        .unwrap();
        assert_eq!(tables, 2);
        assert!(path.exists());
        pool.close().await;
    }

    #[tokio::test]
    async fn closed_pool_reports_closed() {
        let pool = ConnectionPool::in_memory().await.unwrap();
        assert!(!pool.is_closed());
        pool.close().await;
        assert!(pool.is_closed());
    }
}

//! Database manager implementation
//!
//! This module provides database connection management with:
//! - SQLite connection pool using r2d2
//! - Async wrappers that keep blocking work off the tokio runtime
//! - Transaction support for check-then-write sequences

use crate::core::error::{ChatError, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;

/// Database manager with connection pool
pub struct DatabaseManager {
    pool: Pool<SqliteConnectionManager>,
    db_path: PathBuf,
}

impl DatabaseManager {
    /// Create a new DatabaseManager with the specified database path and pool size
    pub fn new(db_path: &Path, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_e| {
                ChatError::DatabaseError(rusqlite::Error::InvalidPath(parent.to_path_buf()))
            })?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            conn.busy_timeout(busy_timeout)?;
            // WAL mode for concurrent readers alongside a writer
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|_e| ChatError::DatabaseError(rusqlite::Error::InvalidQuery))?;

        let manager = Self {
            pool,
            db_path: db_path.to_path_buf(),
        };

        manager.migrate()?;

        Ok(manager)
    }

    /// Create a new DatabaseManager with an in-memory database for testing
    pub fn new_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        // In-memory databases must use a single connection: each new
        // connection would see its own empty database
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|_e| ChatError::DatabaseError(rusqlite::Error::InvalidQuery))?;

        let manager = Self {
            pool,
            db_path: PathBuf::from(":memory:"),
        };

        manager.migrate()?;

        Ok(manager)
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|_e| ChatError::DatabaseError(rusqlite::Error::InvalidQuery))
    }

    /// Execute a database operation asynchronously
    ///
    /// This wraps synchronous database operations in tokio::task::spawn_blocking
    /// to avoid blocking the async runtime.
    pub async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|_e| ChatError::DatabaseError(rusqlite::Error::InvalidQuery))?;
            f(&conn)
        })
        .await
        .map_err(|e| ChatError::TaskError(format!("Database task panicked: {}", e)))?
    }

    /// Execute a database operation within a transaction
    ///
    /// The transaction is automatically committed if the closure returns Ok,
    /// or rolled back if it returns Err. All uniqueness checks that guard a
    /// write run through here so check and write are a single atomic unit.
    ///
    /// Transactions begin IMMEDIATE: the write lock is taken at BEGIN, so a
    /// concurrent check-then-write sees the first writer's commit instead of
    /// a stale read followed by a constraint failure.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|_e| ChatError::DatabaseError(rusqlite::Error::InvalidQuery))?;

            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(ChatError::DatabaseError)?;
            let result = f(&tx)?;
            tx.commit().map_err(ChatError::DatabaseError)?;

            Ok(result)
        })
        .await
        .map_err(|e| ChatError::TaskError(format!("Transaction task panicked: {}", e)))?
    }

    /// Execute database migrations
    pub fn migrate(&self) -> Result<()> {
        let conn = self.get_connection()?;
        crate::db::migrations::run_migrations(&conn)
    }

    /// Get the database file path
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get the current pool size
    pub fn pool_size(&self) -> u32 {
        self.pool.max_size()
    }
}

impl Clone for DatabaseManager {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            db_path: self.db_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_db() -> (DatabaseManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manager = DatabaseManager::new(&db_path, 5, Duration::from_secs(5)).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_database_manager_creation() {
        let (manager, _temp_dir) = create_test_db();
        assert_eq!(manager.pool_size(), 5);
    }

    #[test]
    fn test_get_connection() {
        let (manager, _temp_dir) = create_test_db();
        let conn = manager.get_connection();
        assert!(conn.is_ok());
    }

    #[tokio::test]
    async fn test_execute_async() {
        let (manager, _temp_dir) = create_test_db();

        let result = manager
            .execute(|conn| {
                conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT)", [])
                    .map_err(ChatError::DatabaseError)?;
                Ok(())
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let (manager, _temp_dir) = create_test_db();

        manager
            .execute(|conn| {
                conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value INTEGER)", [])
                    .map_err(ChatError::DatabaseError)?;
                Ok(())
            })
            .await
            .unwrap();

        let result = manager
            .transaction(|tx| {
                tx.execute("INSERT INTO test (value) VALUES (?)", [42])
                    .map_err(ChatError::DatabaseError)?;
                Ok(())
            })
            .await;

        assert!(result.is_ok());

        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM test", [], |row| row.get(0))
                    .map_err(ChatError::DatabaseError)
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_transaction_rollback() {
        let (manager, _temp_dir) = create_test_db();

        manager
            .execute(|conn| {
                conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value INTEGER)", [])
                    .map_err(ChatError::DatabaseError)?;
                Ok(())
            })
            .await
            .unwrap();

        let result: Result<()> = manager
            .transaction(|tx| {
                tx.execute("INSERT INTO test (value) VALUES (?)", [42])
                    .map_err(ChatError::DatabaseError)?;
                Err(ChatError::InvalidRequest("test error".into()))
            })
            .await;

        assert!(result.is_err());

        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM test", [], |row| row.get(0))
                    .map_err(ChatError::DatabaseError)
            })
            .await
            .unwrap();

        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let manager = DatabaseManager::new_in_memory().unwrap();
        assert_eq!(manager.pool_size(), 1);

        // Migrations ran: the members table exists
        let count: i64 = manager
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
                    .map_err(ChatError::DatabaseError)
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

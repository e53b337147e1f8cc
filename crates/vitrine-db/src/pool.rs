//! # Store Connection
//!
//! Opens the SQLite pool every repository shares.
//!
//! ```text
//!   DbConfig::new(path) ──► Database::new(config) ──► SqlitePool ──► migrations
//!                                                         │
//!   db.accounts() / db.catalog() / db.products() / db.coupons() / db.carts() / db.orders()
//!           (each repository holds a clone of the pool)
//! ```
//!
//! File databases run in WAL mode so catalog reads keep going while a
//! shopper's cart line is being written. A busy timeout lets two sessions
//! upserting lines at once wait for each other instead of failing.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::account::AccountRepository;
use crate::repository::cart::CartRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::coupon::CouponRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;

const MEMORY_PATH: &str = ":memory:";

/// Where the store lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("./data/vitrine.db").pool_size(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,

    /// Upper bound on open connections. Default: 5
    pub pool_size: u32,

    /// How long a caller waits for a free connection. Default: 10s
    pub acquire_timeout: Duration,

    /// How long a write waits on a locked database. Default: 5s
    pub busy_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub migrate: bool,
}

impl DbConfig {
    /// A file-backed store; the file is created when missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            pool_size: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            migrate: true,
        }
    }

    /// A private in-memory store, migrated and empty. Used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            // Every connection would otherwise see its own empty database
            pool_size: 1,
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn skip_migrations(mut self) -> Self {
        self.migrate = false;
        self
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .journal_mode(SqliteJournalMode::Memory)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        // Cascades from products to stock and cart lines rely on this
        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }
}

/// Handle to the store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies migrations unless told not to.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), pool_size = config.pool_size, "Opening store");

        let options = config.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            // In-memory data lives only as long as its connection
            .min_connections(if config.is_memory() { 1 } else { 0 })
            .idle_timeout(if config.is_memory() { None } else { Some(Duration::from_secs(600)) })
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        } else {
            debug!("Migrations skipped");
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone())
    }

    /// Categories and sizes.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Products and their per-size stock.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    /// Stored carts of logged-in accounts.
    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Placed orders.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Closes the pool; later repository calls report the store unavailable.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_file_store_keeps_data_between_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vitrine.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.catalog().create_size("M", 3).await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.catalog().list_sizes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.coupons().list().await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/vitrine.db")
            .pool_size(0)
            .busy_timeout(Duration::from_secs(1))
            .skip_migrations();

        assert_eq!(config.pool_size, 1);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.migrate);
        assert!(DbConfig::in_memory().is_memory());
    }
}

//! Access to the database that holds the uploaded records
use crate::Result;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tracing::trace;

/// How long an operation waits for a connection before reporting the store as
/// unreachable
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// An object that represents the connection provider for the location database.
///
/// Every operation acquires a single connection for the duration of one query or
/// transaction; the connection is handed back as soon as the returned guard is
/// dropped.
#[derive(Clone, Debug)]
pub struct Database(Pool<Sqlite>);

impl From<Pool<Sqlite>> for Database {
    /// **WARNING**: This is primarily intended for tests. You should probably
    /// use [Database::open()] instead of creating the pool yourself, since
    /// [Database::open()] will create the `location` table if necessary.
    fn from(value: Pool<Sqlite>) -> Self {
        Self(value)
    }
}

impl Database {
    /// Open the database described by the connection string `url` and make sure
    /// that the schema is up to date.
    pub async fn open(url: &str, acquire_timeout: Duration) -> Result<Self> {
        let db = Self::connect_lazy(url, acquire_timeout)?;
        trace!("Running database migrations");
        sqlx::migrate!("../db/migrations").run(db.pool()).await?;
        Ok(db)
    }

    /// Create a connection provider without touching the database yet. Problems
    /// reaching the database are reported by the first operation that needs a
    /// connection.
    pub fn connect_lazy(url: &str, acquire_timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?;
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(options);
        Ok(Database(pool))
    }

    /// gets a reference to the underlying sqlx connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.0
    }

    /// Acquire a connection for a single operation. It is released when the
    /// returned guard goes out of scope, whether or not the operation succeeded.
    pub async fn connection(&self) -> Result<PoolConnection<Sqlite>> {
        trace!("Acquiring database connection");
        Ok(self.0.acquire().await?)
    }
}

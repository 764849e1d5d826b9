//! PostgreSQL client implementation
//!
//! Connection pooling and error mapping shared by the PostgreSQL document
//! store.

use crate::config::StoreConfig;
use crate::domain::{DocflowError, Result, StoreError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Pooled PostgreSQL connection source
pub struct PostgresClient {
    /// Connection pool
    pool: Pool,

    /// Redacted connection string for logs
    safe_connection_string: String,
}

impl PostgresClient {
    /// Create a new PostgreSQL client
    ///
    /// The pool connects lazily; call [`test_connection`](Self::test_connection)
    /// to verify the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                DocflowError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);
        let connect_timeout = Duration::from_secs(config.connection_timeout_seconds);

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(connect_timeout))
            .create_timeout(Some(connect_timeout))
            .recycle_timeout(Some(connect_timeout))
            .build()
            .map_err(|e| {
                DocflowError::Configuration(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self {
            pool,
            safe_connection_string: config.connection_string_safe(),
        })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| map_pg_error(e, "connection test"))?;

        tracing::debug!(
            connection = %self.safe_connection_string,
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<Object> {
        self.pool.get().await.map_err(|e| {
            StoreError::Connection(format!("Failed to get connection from pool: {}", e)).into()
        })
    }

    /// Connection string with the credentials redacted
    pub fn connection_string_safe(&self) -> &str {
        &self.safe_connection_string
    }
}

/// Maps a driver error to the store taxonomy
///
/// Errors carrying a server response are query failures; everything else
/// (closed socket, I/O) is a connectivity failure.
pub fn map_pg_error(err: tokio_postgres::Error, context: &str) -> DocflowError {
    if err.is_closed() || err.as_db_error().is_none() {
        StoreError::Connection(format!("{context}: {err}")).into()
    } else {
        let message = err
            .as_db_error()
            .map(|db| db.message().to_string())
            .unwrap_or_else(|| err.to_string());
        StoreError::Query(format!("{context}: {message}")).into()
    }
}

/// Quotes a collection name for use as a table identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

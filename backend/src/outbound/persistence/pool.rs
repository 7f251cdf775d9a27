//! Async connection pool shared by the Diesel repositories.
//!
//! Wraps `diesel-async`'s `bb8` integration. Checkout honours the configured
//! timeout, and both checkout and build failures surface as [`PoolError`],
//! which each repository maps into its own connection error.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

/// Connections kept by default; matches the worker count of a small host.
pub const DEFAULT_MAX_SIZE: u32 = 8;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout {
        /// Error detail.
        message: String,
    },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build {
        /// Error detail.
        message: String,
    },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the database connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use edunexus::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://edunexus@localhost/edunexus")
///     .with_max_size(16)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "postgres://edunexus@localhost/edunexus");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Configuration for `database_url` with default limits.
    ///
    /// Defaults to [`DEFAULT_MAX_SIZE`] connections, one idle connection, and
    /// a ten second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: Some(1),
            connection_timeout: Duration::from_secs(10),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Cloneable handle to the PostgreSQL pool; clones share connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool, opening `min_idle` connections up front.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the initial connections fail.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when none frees up within the timeout.
    pub async fn get(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_suit_a_single_host() {
        let config = PoolConfig::new("postgres://localhost/edunexus");

        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, Some(1));
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
    }

    #[rstest]
    #[case(1)]
    #[case(32)]
    fn max_size_is_overridable(#[case] size: u32) {
        let config = PoolConfig::new("postgres://localhost/edunexus")
            .with_max_size(size)
            .with_min_idle(None);

        assert_eq!(config.max_size, size);
        assert_eq!(config.min_idle, None);
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_database_fails_to_build() {
        let config = PoolConfig::new("postgres://nobody@127.0.0.1:1/edunexus")
            .with_connection_timeout(Duration::from_millis(200));
        let err = DbPool::new(config).await.err().expect("port 1 refuses");

        assert!(matches!(err, PoolError::Build { .. }));
        assert!(err.to_string().starts_with("failed to build connection pool"));
    }
}

//! Redis-backed cache over a `bb8` connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, RedisError};
use bb8_redis::{RedisConnectionManager, bb8};
use tracing::debug;

use crate::domain::ports::{CacheError, KeyValueCache};

/// Failure building the Redis pool.
#[derive(Debug, thiserror::Error)]
#[error("failed to build redis pool: {message}")]
pub struct RedisCacheError {
    message: String,
}

impl RedisCacheError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// [`KeyValueCache`] storing plain strings in Redis with a millisecond TTL.
#[derive(Clone)]
pub struct RedisCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisCache {
    /// Connect a pool of at most `max_size` connections to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RedisCacheError`] when the URL is invalid or the first
    /// connection cannot be opened.
    pub async fn connect(url: &str, max_size: u32) -> Result<Self, RedisCacheError> {
        let manager =
            RedisConnectionManager::new(url).map_err(|err| RedisCacheError::new(err.to_string()))?;
        let pool = bb8::Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|err| RedisCacheError::new(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheError::backend(err.to_string()))
    }
}

fn map_redis_error(error: &RedisError) -> CacheError {
    debug!(kind = ?error.kind(), "redis command failed");
    CacheError::backend(error.to_string())
}

/// Redis rejects `PX 0`; anything shorter than a millisecond rounds up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))
    }
}

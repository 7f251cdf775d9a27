//! Port interface for the expiring key-value cache.
//!
//! Verification codes, reset token fingerprints, and listing snapshots are
//! all stored as strings with a time-to-live.
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum CacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "cache serialisation failed: {message}",
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Backend { message } => {
                tracing::warn!(%message, "cache unavailable");
                Self::service_unavailable("cache unavailable")
            }
            CacheError::Serialization { message } => {
                Self::internal(format!("cache serialisation failed: {message}"))
            }
        }
    }
}

/// String cache with per-entry expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry; missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Read a JSON snapshot from the cache.
///
/// Entries that fail to decode are treated as misses so a schema change
/// never poisons reads.
pub async fn get_json<T, C>(cache: &C, key: &str) -> Result<Option<T>, CacheError>
where
    T: DeserializeOwned,
    C: KeyValueCache + ?Sized,
{
    let Some(raw) = cache.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::debug!(%key, error = %err, "discarding undecodable cache entry");
            Ok(None)
        }
    }
}

/// Store a JSON snapshot in the cache.
pub async fn set_json<T, C>(cache: &C, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
where
    T: Serialize + Sync,
    C: KeyValueCache + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|err| CacheError::serialization(err.to_string()))?;
    cache.set(key, &raw, ttl).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_json_treats_garbage_as_miss() {
        let mut cache = MockKeyValueCache::new();
        cache
            .expect_get()
            .withf(|key| key == "course_list")
            .return_once(|_| Ok(Some("{not json".to_owned())));

        let value: Option<Vec<String>> = get_json(&cache, "course_list").await.expect("read");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn set_json_serialises_value() {
        let mut cache = MockKeyValueCache::new();
        cache
            .expect_set()
            .withf(|key, value, ttl| {
                key == "k" && value == "[\"a\"]" && *ttl == Duration::from_secs(5)
            })
            .return_once(|_, _, _| Ok(()));

        set_json(&cache, "k", &vec!["a"], Duration::from_secs(5))
            .await
            .expect("write");
    }
}

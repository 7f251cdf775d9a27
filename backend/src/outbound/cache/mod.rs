//! Key-value cache adapters.
//!
//! - [`InMemoryCache`]: process-local map with expiry read from a [`Clock`],
//!   used when no Redis URL is configured and in tests.
//! - [`RedisCache`]: `bb8-redis` pool issuing `GET`, `SET PX`, and `DEL`.
//!
//! [`Clock`]: mockable::Clock

mod memory;
mod redis;

pub use memory::InMemoryCache;
pub use redis::{RedisCache, RedisCacheError};

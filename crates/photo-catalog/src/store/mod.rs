//! Key-value stores for the serialized listing

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A key-value store with per-write expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value. Expired and absent keys both yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one, expiring after `ttl`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

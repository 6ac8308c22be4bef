//! Redis-backed store

use super::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

/// Store backed by a single shared Redis connection.
///
/// The connection is opened once and multiplexed across all callers;
/// `ConnectionManager` reconnects on its own after the server goes away.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis at `url` (e.g. "redis://127.0.0.1/")
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        info!("Connected to Redis");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(key, value, expiry_seconds(ttl)).await?;
        Ok(())
    }
}

/// SETEX takes whole seconds and rejects zero
fn expiry_seconds(ttl: Duration) -> u64 {
    let mut secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}

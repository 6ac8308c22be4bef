//! In-process store backed by moka

use super::CacheStore;
use crate::error::Result;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Stored {
    value: String,
    ttl: Duration,
}

/// Each write carries its own time-to-live
struct PerEntryTtl;

impl Expiry<String, Stored> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Stored,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Stored,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Store used when no external cache endpoint is configured
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, Stored>,
}

impl MemoryStore {
    const MAX_ENTRIES: u64 = 1_000;

    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(Self::MAX_ENTRIES)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.cache
            .insert(
                key.to_string(),
                Stored {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}

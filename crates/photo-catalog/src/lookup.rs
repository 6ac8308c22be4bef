//! Read-through cached catalog lookup
//!
//! Listings are served from the cache store while the entry is fresh and
//! rebuilt from the image source on a miss. Concurrent misses each rebuild
//! and each write the cache; the last write wins. Cache failures are never
//! fatal: a failed read is handled as a miss and a failed write is logged.

use crate::builder::CatalogBuilder;
use crate::error::{CatalogError, Result};
use crate::source::ImageSource;
use crate::store::CacheStore;
use crate::types::{CacheStats, ImageEntry, Listing};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key under which the serialized listing is stored
pub const CACHE_KEY: &str = "photos:list";

/// How long a written listing stays fresh
pub const CACHE_TTL: Duration = Duration::from_secs(60);

pub struct PhotoCatalog {
    builder: CatalogBuilder,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PhotoCatalog {
    pub fn new(source: Arc<dyn ImageSource>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            builder: CatalogBuilder::new(source),
            store,
            ttl: CACHE_TTL,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Override the listing time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// List all photos, from the cache when fresh
    pub async fn list_photos(&self) -> Result<Listing> {
        if let Some(photos) = self.read_cached().await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = CACHE_KEY, count = photos.len(), "Cache hit");
            return Ok(Listing {
                photos,
                from_cache: true,
            });
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        info!(
            key = CACHE_KEY,
            dir = %self.builder.source().describe(),
            "Cache miss, reading from filesystem"
        );
        let photos = self.builder.build().await?;

        if let Err(e) = self.write_cached(&photos).await {
            // Continue even if caching fails
            warn!(key = CACHE_KEY, error = %e, "Failed to cache photo listing");
        }

        Ok(Listing {
            photos,
            from_cache: false,
        })
    }

    /// Resolve a photo id to its file, always against a fresh listing
    pub async fn get_photo_by_id(&self, id: i64) -> Result<PathBuf> {
        let path = self.builder.resolve(id).await?;
        debug!(id, path = %path.display(), "Resolved photo");
        Ok(path)
    }

    async fn read_cached(&self) -> Option<Vec<ImageEntry>> {
        let raw = match self.store.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = CACHE_KEY, error = %e, "Cache read failed, falling back to filesystem");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(photos) => Some(photos),
            Err(e) => {
                warn!(key = CACHE_KEY, error = %e, "Discarding unreadable cached listing");
                None
            }
        }
    }

    async fn write_cached(&self, photos: &[ImageEntry]) -> Result<()> {
        let serialized = serde_json::to_string(photos)
            .map_err(|e| CatalogError::CacheUnavailable(e.to_string()))?;
        self.store
            .set_with_expiry(CACHE_KEY, &serialized, self.ttl)
            .await
    }
}

//! Core types for the photo catalog

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One image as exposed to clients.
///
/// `id` is the zero-based position of the entry in the directory listing it
/// was built from. It is only meaningful within that listing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: u64,
    pub name: String,
    pub url: String,
}

impl ImageEntry {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: format!("/photos/{}", id),
        }
    }
}

/// A raw directory entry as reported by an image source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Result of a catalog listing
#[derive(Debug, Clone)]
pub struct Listing {
    pub photos: Vec<ImageEntry>,
    pub from_cache: bool,
}

/// Hit/miss counters for the listing cache
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

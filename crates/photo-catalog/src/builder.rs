//! Catalog construction from an image source

use crate::error::{CatalogError, Result};
use crate::source::ImageSource;
use crate::types::{ImageEntry, SourceEntry};
use std::path::PathBuf;
use std::sync::Arc;

/// Turns a directory enumeration into a positional catalog.
///
/// Every call re-reads the source; nothing is retained between calls.
#[derive(Clone)]
pub struct CatalogBuilder {
    source: Arc<dyn ImageSource>,
}

impl CatalogBuilder {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<dyn ImageSource> {
        &self.source
    }

    /// Build the catalog, one entry per directory entry in enumeration order
    pub async fn build(&self) -> Result<Vec<ImageEntry>> {
        let entries = self.source.list().await?;
        Ok(to_catalog(entries))
    }

    /// Resolve a catalog index to a filesystem path against a fresh listing
    pub async fn resolve(&self, id: i64) -> Result<PathBuf> {
        let mut entries = self.source.list().await?;

        let index = usize::try_from(id).map_err(|_| CatalogError::NotFound(id))?;
        if index >= entries.len() {
            return Err(CatalogError::NotFound(id));
        }

        Ok(entries.swap_remove(index).path)
    }
}

fn to_catalog(entries: Vec<SourceEntry>) -> Vec<ImageEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| ImageEntry::new(index as u64, entry.name))
        .collect()
}

//! Directory enumeration

use crate::error::{CatalogError, Result};
use crate::types::SourceEntry;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Something that can enumerate image candidates
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// List every entry, in enumeration order
    async fn list(&self) -> Result<Vec<SourceEntry>>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

/// Images stored in a single directory on local disk.
///
/// Every entry counts, including subdirectories. Entries are ordered by the
/// raw bytes of their file names, so ids stay put between listings of an
/// unchanged directory.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    root: PathBuf,
}

impl LocalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageSource for LocalDirectory {
    async fn list(&self) -> Result<Vec<SourceEntry>> {
        let mut dir = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| CatalogError::filesystem(&self.root, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| CatalogError::filesystem(&self.root, e))?
        {
            entries.push(SourceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

        debug!(dir = %self.root.display(), count = entries.len(), "Enumerated image directory");
        Ok(entries)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

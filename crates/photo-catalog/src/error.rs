//! Error types for the photo catalog

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CatalogError {
    /// The image directory (or a file in it) could not be read
    Filesystem {
        path: PathBuf,
        source: Box<std::io::Error>,
    },
    /// The cache store could not be read from or written to
    CacheUnavailable(String),
    /// No image exists at the requested index
    NotFound(i64),
}

impl CatalogError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Filesystem {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Filesystem { path, source } => {
                write!(f, "Filesystem error at {}: {}", path.display(), source)
            }
            CatalogError::CacheUnavailable(msg) => write!(f, "Cache unavailable: {}", msg),
            CatalogError::NotFound(id) => write!(f, "No image with id {}", id),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Filesystem { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<redis::RedisError> for CatalogError {
    fn from(err: redis::RedisError) -> Self {
        CatalogError::CacheUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

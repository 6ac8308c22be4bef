//! Photo catalog
//!
//! Enumerates the images in a local directory into an indexable listing and
//! serves that listing through a time-bounded, read-through cache. The cache
//! store and the directory are both injected collaborators so the lookup can
//! run against Redis in production and against in-process doubles in tests.

pub mod builder;
pub mod error;
pub mod lookup;
pub mod source;
pub mod store;
pub mod types;

pub use builder::CatalogBuilder;
pub use error::{CatalogError, Result};
pub use lookup::{PhotoCatalog, CACHE_KEY, CACHE_TTL};
pub use source::{ImageSource, LocalDirectory};
pub use store::{CacheStore, MemoryStore, RedisStore};
pub use types::{CacheStats, ImageEntry, Listing, SourceEntry};

//! Local page cache.
//!
//! Fetched pages are stored verbatim, one file per key. Listing pages are
//! stamped with the day they were fetched and go stale at midnight; activity
//! detail pages never change and are kept forever.

pub mod key;
pub mod manager;

pub use key::CacheKey;
pub use manager::{FileCache, MemoryCache};

use crate::error::Result;

/// Storage for raw page contents.
pub trait PageCache: Send + Sync {
    /// Cached content for `key`, or `None` when nothing is stored.
    fn read(&self, key: &CacheKey) -> Result<Option<String>>;

    fn write(&self, key: &CacheKey, contents: &str) -> Result<()>;
}

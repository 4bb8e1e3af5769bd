use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::debug;

use super::key::{date_stamp, listing_stamp, CacheKey};
use super::PageCache;
use crate::error::{MilesError, Result};

/// Raw page cache stored as one plain file per key under a root directory.
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    /// The directory is created lazily on first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of `key` directly inside the cache directory. Names that would
    /// land anywhere else are refused.
    fn cache_path(&self, key: &CacheKey) -> Result<PathBuf> {
        let name = key.file_name();
        let mut components = Path::new(&name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.cache_dir.join(name)),
            _ => Err(MilesError::io(
                self.cache_dir.join(&name),
                std::io::Error::new(ErrorKind::InvalidInput, "cache key is not a plain file name"),
            )),
        }
    }

    /// Delete listing pages stamped with any day other than `today`.
    ///
    /// Activity pages are left alone since they never expire. Returns the
    /// number of files removed.
    pub fn prune_stale_listings(&self, today: NaiveDate) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(MilesError::io(&self.cache_dir, e)),
        };

        let today = date_stamp(today);
        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|e| MilesError::io(&self.cache_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match listing_stamp(name) {
                Some(stamp) if stamp != today => {
                    let path = entry.path();
                    std::fs::remove_file(&path).map_err(|e| MilesError::io(&path, e))?;
                    debug!(file = name, "Pruned stale listing page");
                    removed += 1;
                }
                _ => {}
            }
        }
        Ok(removed)
    }
}

impl PageCache for FileCache {
    fn read(&self, key: &CacheKey) -> Result<Option<String>> {
        let path = self.cache_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MilesError::io(path, e)),
        }
    }

    fn write(&self, key: &CacheKey, contents: &str) -> Result<()> {
        // The target's parent is always the cache directory itself
        let path = self.cache_path(key)?;
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| MilesError::io(&self.cache_dir, e))?;

        // Write beside the target and rename so readers never see a partial page
        let mut tmp =
            NamedTempFile::new_in(&self.cache_dir).map_err(|e| MilesError::io(&self.cache_dir, e))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| MilesError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| MilesError::io(&path, e.error))?;

        debug!(key = %key, "Cached page");
        Ok(())
    }
}

/// Process-local cache, handy for tests and one-off runs that shouldn't touch disk.
#[derive(Default)]
pub struct MemoryCache {
    pages: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for MemoryCache {
    fn read(&self, key: &CacheKey) -> Result<Option<String>> {
        let pages = self
            .pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(pages.get(&key.file_name()).cloned())
    }

    fn write(&self, key: &CacheKey, contents: &str) -> Result<()> {
        let mut pages = self
            .pages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        pages.insert(key.file_name(), contents.to_string());
        Ok(())
    }
}

use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MilesError, Result};

/// Prefix shared by every cache file name
const KEY_PREFIX: &str = "runkeeper";

/// Extension of cached pages. The content is raw HTML; the name is historical.
const KEY_EXTENSION: &str = "xml";

/// Date stamp format (yyyymmdd) embedded in listing keys
const DATE_STAMP_FORMAT: &str = "%Y%m%d";

static LISTING_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^runkeeper\..+\.activities\.(\d{8})\.xml$").expect("listing file pattern is valid")
});

/// Identifies one cached page on disk.
///
/// Listing pages carry the day they were fetched, so a new day means a new
/// key and a cache miss. Activity detail pages are keyed by id alone and
/// never expire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Listing { user: String, date: NaiveDate },
    Activity { id: String },
}

impl CacheKey {
    pub fn listing(user: impl Into<String>, date: NaiveDate) -> Self {
        CacheKey::Listing {
            user: user.into(),
            date,
        }
    }

    pub fn activity(id: impl Into<String>) -> Self {
        CacheKey::Activity { id: id.into() }
    }

    /// File name for this key, e.g. `runkeeper.alice.activities.20240316.xml`
    pub fn file_name(&self) -> String {
        match self {
            CacheKey::Listing { user, date } => format!(
                "{}.{}.activities.{}.{}",
                KEY_PREFIX,
                user,
                date_stamp(*date),
                KEY_EXTENSION
            ),
            CacheKey::Activity { id } => {
                format!("{}.activity.{}.{}", KEY_PREFIX, id, KEY_EXTENSION)
            }
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Reject user identifiers that can't appear in a profile URL or a cache
/// file name: empty ones, path separators and `..`.
pub fn validate_user(user: &str) -> Result<()> {
    let unsafe_char = |c: char| c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
    if user.is_empty() || user.contains("..") || user.chars().any(unsafe_char) {
        return Err(MilesError::InvalidUser(user.to_string()));
    }
    Ok(())
}

pub fn date_stamp(date: NaiveDate) -> String {
    date.format(DATE_STAMP_FORMAT).to_string()
}

/// Date stamp of a listing cache file name, if it is one.
pub fn listing_stamp(file_name: &str) -> Option<&str> {
    LISTING_FILE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

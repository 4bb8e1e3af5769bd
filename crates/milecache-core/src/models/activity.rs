use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{MilesError, Result};
use crate::page::{ActivityPageSource, DetailPage};
use crate::utils::{parse_leading_float, parse_start_date};

static ACTIVITY_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("activity number pattern is valid"));

/// Activity id embedded in a detail page path: the first run of digits.
pub fn activity_number(path: &str) -> Result<&str> {
    ACTIVITY_NUMBER
        .find(path)
        .map(|m| m.as_str())
        .ok_or_else(|| MilesError::Lookup(path.to_string()))
}

/// Values read off an activity's detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDetail {
    /// Distance in miles; 0.0 when the page shows no usable number
    pub miles: f64,
    /// Raw start date text, parsed on demand
    pub date_text: Option<String>,
}

impl From<DetailPage> for ActivityDetail {
    fn from(page: DetailPage) -> Self {
        Self {
            miles: page.distance_text.as_deref().map(parse_leading_float).unwrap_or(0.0),
            date_text: page.date_text,
        }
    }
}

/// One logged exercise session from a user's activity list.
///
/// The detail page is unresolved until `miles` or `started_at` is first
/// asked for; after that it stays resolved for the life of the value.
#[derive(Debug)]
pub struct Activity {
    path: String,
    detail: OnceCell<ActivityDetail>,
}

impl Activity {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            detail: OnceCell::new(),
        }
    }

    /// Relative URL of the detail page
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn number(&self) -> Result<&str> {
        activity_number(&self.path)
    }

    pub fn is_resolved(&self) -> bool {
        self.detail.initialized()
    }

    async fn resolve(&self, source: &ActivityPageSource) -> Result<&ActivityDetail> {
        self.detail
            .get_or_try_init(|| async {
                debug!(path = %self.path, "Resolving activity detail");
                let page = source.detail_page(&self.path).await?;
                Ok::<_, MilesError>(ActivityDetail::from(page))
            })
            .await
    }

    pub async fn miles(&self, source: &ActivityPageSource) -> Result<f64> {
        Ok(self.resolve(source).await?.miles)
    }

    /// When the activity started. Missing or unreadable date text is an error.
    pub async fn started_at(&self, source: &ActivityPageSource) -> Result<NaiveDateTime> {
        let detail = self.resolve(source).await?;
        let text = detail.date_text.as_deref().unwrap_or_default();
        parse_start_date(text).ok_or_else(|| MilesError::Parse {
            path: self.path.clone(),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::testing::{day, detail_fixture, source_with, FixtureFetcher};
    use crate::ErrorKind;
    use std::sync::Arc;

    const BASE: &str = "http://runkeeper.test";

    fn source_for(page: &str) -> (ActivityPageSource, Arc<FixtureFetcher>) {
        let fetcher = Arc::new(
            FixtureFetcher::new().with_page(&format!("{}/user/alice/activity/101", BASE), page),
        );
        let source = source_with(BASE, Arc::new(MemoryCache::new()), fetcher.clone(), day(2024, 3, 16));
        (source, fetcher)
    }

    #[test]
    fn test_number() {
        assert_eq!(Activity::new("/user/alice/activity/101").number().unwrap(), "101");
        assert_eq!(activity_number("/activity/42?x=7").unwrap(), "42");

        let err = Activity::new("/user/alice/activity/").number().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[tokio::test]
    async fn test_detail_resolved_once() {
        let (source, fetcher) = source_for(&detail_fixture("2024-03-15", "3.1 mi"));
        let activity = Activity::new("/user/alice/activity/101");
        assert!(!activity.is_resolved());

        assert_eq!(activity.miles(&source).await.unwrap(), 3.1);
        assert!(activity.is_resolved());
        let started = activity.started_at(&source).await.unwrap();
        assert_eq!(started.date(), day(2024, 3, 15));
        activity.miles(&source).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_distance_is_zero() {
        let (source, _) = source_for(&detail_fixture("2024-03-15", "N/A"));
        let activity = Activity::new("/user/alice/activity/101");
        assert_eq!(activity.miles(&source).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_missing_distance_is_zero() {
        let (source, _) = source_for("date: 2024-03-15\n");
        let activity = Activity::new("/user/alice/activity/101");
        assert_eq!(activity.miles(&source).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_missing_date_is_parse_error() {
        let (source, _) = source_for("distance: 4.0\n");
        let activity = Activity::new("/user/alice/activity/101");

        let err = activity.started_at(&source).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        // Distance is still readable from the same page
        assert_eq!(activity.miles(&source).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn test_unparseable_date_is_parse_error() {
        let (source, _) = source_for(&detail_fixture("last Tuesday", "4.0"));
        let activity = Activity::new("/user/alice/activity/101");

        let err = activity.started_at(&source).await.unwrap_err();
        assert!(matches!(err, MilesError::Parse { ref text, .. } if text == "last Tuesday"));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_activity_unresolved() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let source = source_with(BASE, Arc::new(MemoryCache::new()), fetcher.clone(), day(2024, 3, 16));
        let activity = Activity::new("/user/alice/activity/101");

        assert_eq!(activity.miles(&source).await.unwrap_err().kind(), ErrorKind::Network);
        assert!(!activity.is_resolved());
    }
}

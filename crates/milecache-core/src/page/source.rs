use std::sync::Arc;

use tracing::{debug, info};

use super::{DetailPage, HtmlInterpreter, ListingPage, PageInterpreter};
use crate::cache::key::validate_user;
use crate::cache::{CacheKey, FileCache, PageCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::models::activity::activity_number;

/// Path segment before the user identifier in listing URLs
const USER_PATH: &str = "/user/";

/// Hands out interpreted pages, preferring the local cache over the network.
#[derive(Clone)]
pub struct ActivityPageSource {
    base_url: String,
    cache: Arc<dyn PageCache>,
    fetcher: Arc<dyn PageFetcher>,
    interpreter: Arc<dyn PageInterpreter>,
    clock: Arc<dyn Clock>,
}

impl ActivityPageSource {
    /// Production wiring: file cache, throttled HTTP, the site's markup, the system clock.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::from_parts(
            config.base_url(),
            Arc::new(FileCache::new(config.cache_dir.clone())),
            Arc::new(HttpFetcher::new(config)?),
            Arc::new(HtmlInterpreter::new()?),
            Arc::new(SystemClock),
        ))
    }

    pub fn from_parts(
        base_url: &str,
        cache: Arc<dyn PageCache>,
        fetcher: Arc<dyn PageFetcher>,
        interpreter: Arc<dyn PageInterpreter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            fetcher,
            interpreter,
            clock,
        }
    }

    pub fn listing_url(&self, user: &str) -> String {
        format!("{}{}{}/activitylist", self.base_url, USER_PATH, user)
    }

    pub fn detail_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The user's activity list, cached for the rest of today.
    pub async fn listing_page(&self, user: &str) -> Result<ListingPage> {
        validate_user(user)?;
        let key = CacheKey::listing(user, self.clock.today());

        let raw = match self.cache.read(&key)? {
            Some(raw) => {
                debug!(user = user, key = %key, "Activity list cache hit");
                raw
            }
            None => {
                info!("Downloading the activities for {}", user);
                self.fetch_and_cache(&key, &self.listing_url(user)).await?
            }
        };

        Ok(self.interpreter.listing(&raw))
    }

    /// One activity's detail page, cached indefinitely by activity id.
    pub async fn detail_page(&self, path: &str) -> Result<DetailPage> {
        let key = CacheKey::activity(activity_number(path)?);

        let raw = match self.cache.read(&key)? {
            Some(raw) => {
                debug!(path = path, key = %key, "Activity cache hit");
                raw
            }
            None => {
                info!("Downloading the activity on {}", path);
                self.fetch_and_cache(&key, &self.detail_url(path)).await?
            }
        };

        Ok(self.interpreter.detail(&raw))
    }

    async fn fetch_and_cache(&self, key: &CacheKey, url: &str) -> Result<String> {
        let raw = self.fetcher.fetch(url).await?;
        self.cache.write(key, &raw)?;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::testing::{day, detail_fixture, listing_fixture, source_with, FixtureFetcher};
    use crate::ErrorKind;

    const BASE: &str = "http://runkeeper.test";

    #[tokio::test]
    async fn test_listing_miss_fetches_and_caches() {
        let fetcher = Arc::new(FixtureFetcher::new().with_page(
            &format!("{}/user/alice/activitylist", BASE),
            &listing_fixture("Alice", &["/user/alice/activity/101"]),
        ));
        let cache = Arc::new(MemoryCache::new());
        let source = source_with(BASE, cache.clone(), fetcher.clone(), day(2024, 3, 16));

        let page = source.listing_page("alice").await.unwrap();

        assert_eq!(page.name, "Alice");
        assert_eq!(page.activity_paths, vec!["/user/alice/activity/101"]);
        assert_eq!(fetcher.calls(), 1);
        let key = CacheKey::listing("alice", day(2024, 3, 16));
        assert!(cache.read(&key).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_listing_cached_today_never_fetches() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let cache = Arc::new(MemoryCache::new());
        cache
            .write(
                &CacheKey::listing("alice", day(2024, 3, 16)),
                &listing_fixture("Alice", &["/user/alice/activity/101"]),
            )
            .unwrap();
        let source = source_with(BASE, cache, fetcher.clone(), day(2024, 3, 16));

        let page = source.listing_page("alice").await.unwrap();

        assert_eq!(page.activity_paths.len(), 1);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_listing_cached_yesterday_is_refetched() {
        let listing = listing_fixture("Alice", &[]);
        let fetcher = Arc::new(
            FixtureFetcher::new().with_page(&format!("{}/user/alice/activitylist", BASE), &listing),
        );
        let cache = Arc::new(MemoryCache::new());
        cache
            .write(&CacheKey::listing("alice", day(2024, 3, 15)), &listing)
            .unwrap();
        let source = source_with(BASE, cache, fetcher.clone(), day(2024, 3, 16));

        source.listing_page("alice").await.unwrap();

        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_detail_uses_activity_key_and_url() {
        let fetcher = Arc::new(FixtureFetcher::new().with_page(
            &format!("{}/user/alice/activity/101", BASE),
            &detail_fixture("2024-03-15", "3.1"),
        ));
        let cache = Arc::new(MemoryCache::new());
        let source = source_with(BASE, cache.clone(), fetcher.clone(), day(2024, 3, 16));

        let page = source.detail_page("/user/alice/activity/101").await.unwrap();
        assert_eq!(page.distance_text.as_deref(), Some("3.1"));
        assert!(cache.read(&CacheKey::activity("101")).unwrap().is_some());

        // Detail pages don't expire with the day
        let later = source_with(BASE, cache, fetcher.clone(), day(2025, 1, 1));
        later.detail_page("/user/alice/activity/101").await.unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_detail_path_without_id_is_lookup_error() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let source = source_with(BASE, Arc::new(MemoryCache::new()), fetcher.clone(), day(2024, 3, 16));

        let err = source.detail_page("/user/alice/activity/").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Lookup);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_caches_nothing() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let cache = Arc::new(MemoryCache::new());
        let source = source_with(BASE, cache.clone(), fetcher, day(2024, 3, 16));

        let err = source.listing_page("nobody").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unsafe_user_touches_neither_cache_nor_network() {
        let fetcher = Arc::new(FixtureFetcher::new());
        let cache = Arc::new(MemoryCache::new());
        let source = source_with(BASE, cache.clone(), fetcher.clone(), day(2024, 3, 16));

        for user in ["../../etc", "team/alice", ""] {
            let err = source.listing_page(user).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidQuery);
        }
        assert_eq!(fetcher.calls(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_urls() {
        let source = source_with(
            "http://www.runkeeper.com/",
            Arc::new(MemoryCache::new()),
            Arc::new(FixtureFetcher::new()),
            day(2024, 3, 16),
        );
        assert_eq!(
            source.listing_url("alice"),
            "http://www.runkeeper.com/user/alice/activitylist"
        );
        assert_eq!(
            source.detail_url("/user/alice/activity/101"),
            "http://www.runkeeper.com/user/alice/activity/101"
        );
    }
}

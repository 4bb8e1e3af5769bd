//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::cache::PageCache;
use crate::clock::FixedClock;
use crate::error::{MilesError, Result};
use crate::fetch::PageFetcher;
use crate::page::{ActivityPageSource, DetailPage, ListingPage, PageInterpreter};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Serves canned pages by URL and counts every request.
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| MilesError::NotFound(url.to_string()))
    }
}

/// Reads a line-based stand-in for the site's markup:
///
/// ```text
/// name: Alice
/// activity: /user/alice/activity/101
/// date: 2024-03-15
/// distance: 3.1
/// ```
pub struct FixtureInterpreter;

fn fields<'a>(raw: &'a str, field: &'a str) -> impl Iterator<Item = String> + 'a {
    raw.lines().filter_map(move |line| {
        let (name, value) = line.split_once(':')?;
        (name.trim() == field).then(|| value.trim().to_string())
    })
}

impl PageInterpreter for FixtureInterpreter {
    fn listing(&self, raw: &str) -> ListingPage {
        ListingPage {
            name: fields(raw, "name").next().unwrap_or_default(),
            activity_paths: fields(raw, "activity").collect(),
        }
    }

    fn detail(&self, raw: &str) -> DetailPage {
        DetailPage {
            distance_text: fields(raw, "distance").next(),
            date_text: fields(raw, "date").next(),
        }
    }
}

pub fn listing_fixture(name: &str, paths: &[&str]) -> String {
    let mut page = format!("name: {}\n", name);
    for path in paths {
        page.push_str(&format!("activity: {}\n", path));
    }
    page
}

pub fn detail_fixture(date: &str, distance: &str) -> String {
    format!("date: {}\ndistance: {}\n", date, distance)
}

pub fn source_with(
    base_url: &str,
    cache: Arc<dyn PageCache>,
    fetcher: Arc<dyn PageFetcher>,
    today: NaiveDate,
) -> ActivityPageSource {
    ActivityPageSource::from_parts(
        base_url,
        cache,
        fetcher,
        Arc::new(FixtureInterpreter),
        Arc::new(FixedClock(today)),
    )
}

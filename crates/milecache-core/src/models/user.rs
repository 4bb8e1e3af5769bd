use crate::error::Result;
use crate::page::{ActivityPageSource, ListingPage};

use super::Activity;

/// A scraped profile: display name and activities as listed, newest first.
#[derive(Debug)]
pub struct User {
    name: String,
    activities: Vec<Activity>,
}

impl User {
    /// Build from a listing page. A page without the expected markup gives an
    /// empty name and no activities.
    pub fn from_listing(page: ListingPage) -> Self {
        Self {
            name: page.name,
            activities: page.activity_paths.into_iter().map(Activity::new).collect(),
        }
    }

    /// Fetch (or read from today's cache) the user's activity list.
    pub async fn fetch(source: &ActivityPageSource, user: &str) -> Result<Self> {
        Ok(Self::from_listing(source.listing_page(user).await?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }
}

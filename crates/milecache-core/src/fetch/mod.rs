//! Network access to the activity site.
//!
//! Everything that touches the network goes through a `PageFetcher`. The
//! HTTP implementation waits a fixed delay before every request and lets
//! only one request run at a time.

pub mod client;

pub use client::HttpFetcher;

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw body of `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

//! milecache core library.
//!
//! Scrapes a Runkeeper user's public activity pages and totals the distance
//! covered in a given month. Pages are cached on disk so repeated queries on
//! the same day don't touch the network:
//!
//! - activity list pages are cached per user per day
//! - activity detail pages are cached forever, keyed by activity id
//!
//! ```no_run
//! # async fn run() -> milecache_core::Result<()> {
//! let config = milecache_core::Config::default();
//! let miles = milecache_core::monthly_miles(&config, "alice", 2024, 3).await?;
//! println!("{:.2}", miles);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod calculator;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod page;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheKey, FileCache, MemoryCache, PageCache};
pub use calculator::{monthly_miles, MonthlyMiles, MonthlyMilesCalculator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{ErrorKind, MilesError, Result};
pub use fetch::{HttpFetcher, PageFetcher};
pub use models::{Activity, User};
pub use page::{ActivityPageSource, DetailPage, HtmlInterpreter, ListingPage, PageInterpreter};

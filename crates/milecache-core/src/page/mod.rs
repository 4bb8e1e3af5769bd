//! Turning raw pages into the few values the scraper needs.
//!
//! A `PageInterpreter` knows the site's markup; `ActivityPageSource` knows
//! where pages come from. Nothing else in the crate looks at HTML.

pub mod markup;
pub mod source;

pub use markup::HtmlInterpreter;
pub use source::ActivityPageSource;

/// What a user's activity list page tells us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Display name, empty when the page has none
    pub name: String,
    /// Detail page paths in the order they appear on the page
    pub activity_paths: Vec<String>,
}

/// What an activity detail page tells us, as raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    pub distance_text: Option<String>,
    pub date_text: Option<String>,
}

pub trait PageInterpreter: Send + Sync {
    fn listing(&self, raw: &str) -> ListingPage;

    fn detail(&self, raw: &str) -> DetailPage;
}

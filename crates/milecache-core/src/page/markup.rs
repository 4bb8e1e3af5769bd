use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{DetailPage, ListingPage, PageInterpreter};
use crate::error::{MilesError, Result};

const USERNAME_SELECTOR: &str = ".username .usernameLinkNoSpace";
const ACTIVITY_ITEM_SELECTOR: &str = "#activityHistoryMenu .menuItem";
const DISTANCE_SELECTOR: &str = "#statsDistance .mainText";
const DATE_SELECTOR: &str = "#activityDateText .secondary";

/// Attribute on each activity menu item holding the detail page path
const ACTIVITY_LINK_ATTR: &str = "link";

/// Reads Runkeeper's activity pages with CSS selectors.
///
/// Cached and freshly fetched pages both go through the same lenient HTML
/// parser, so a page reads the same whether or not it came from disk.
#[derive(Debug, Clone)]
pub struct HtmlInterpreter {
    username: Selector,
    activity_item: Selector,
    distance: Selector,
    date: Selector,
}

impl HtmlInterpreter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            username: selector(USERNAME_SELECTOR)?,
            activity_item: selector(ACTIVITY_ITEM_SELECTOR)?,
            distance: selector(DISTANCE_SELECTOR)?,
            date: selector(DATE_SELECTOR)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| MilesError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

impl PageInterpreter for HtmlInterpreter {
    fn listing(&self, raw: &str) -> ListingPage {
        let document = Html::parse_document(raw);

        let name: String = document.select(&self.username).map(element_text).collect();

        let mut activity_paths = Vec::new();
        for item in document.select(&self.activity_item) {
            match item.value().attr(ACTIVITY_LINK_ATTR) {
                Some(link) => activity_paths.push(link.trim().to_string()),
                None => warn!(html = %item.html(), "Activity menu item has no link"),
            }
        }

        ListingPage {
            name: name.trim().to_string(),
            activity_paths,
        }
    }

    fn detail(&self, raw: &str) -> DetailPage {
        let document = Html::parse_document(raw);

        // Every matching distance node counts; only the first date node does
        let distance: Vec<String> = document.select(&self.distance).map(element_text).collect();
        let distance_text = (!distance.is_empty()).then(|| distance.concat());

        let date_text = document.select(&self.date).next().map(element_text);

        DetailPage {
            distance_text,
            date_text,
        }
    }
}

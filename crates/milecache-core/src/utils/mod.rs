//! Lenient text parsing helpers for scraped page values.

pub mod format;

pub use format::{parse_leading_float, parse_start_date};

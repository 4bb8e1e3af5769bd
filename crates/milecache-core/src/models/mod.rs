//! Scraped entities.
//!
//! - `User`: display name plus activities in listing order (newest first)
//! - `Activity`: one session whose distance and start date come from its
//!   detail page, fetched on first use

pub mod activity;
pub mod user;

pub use activity::{Activity, ActivityDetail};
pub use user::User;

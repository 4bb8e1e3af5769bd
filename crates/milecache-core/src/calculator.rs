//! Monthly distance totals.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{MilesError, Result};
use crate::models::User;
use crate::page::ActivityPageSource;

/// Outcome of one monthly query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMiles {
    /// Identifier the query was made with
    pub user: String,
    /// Display name scraped from the listing page (may be empty)
    pub user_name: String,
    pub year: i32,
    pub month: u32,
    pub total_miles: f64,
    /// Activities whose miles were added to the total
    pub activities_counted: usize,
    /// Activities whose start date was looked at, including the one that ended the scan
    pub activities_inspected: usize,
}

impl MonthlyMiles {
    /// Name to show for the user, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        if self.user_name.is_empty() {
            &self.user
        } else {
            &self.user_name
        }
    }
}

pub struct MonthlyMilesCalculator {
    source: ActivityPageSource,
}

impl MonthlyMilesCalculator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_source(ActivityPageSource::new(config)?))
    }

    pub fn with_source(source: ActivityPageSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &ActivityPageSource {
        &self.source
    }

    /// Total miles `user` logged in `year`/`month`.
    pub async fn monthly_miles(&self, user: &str, year: i32, month: u32) -> Result<f64> {
        Ok(self.monthly_report(user, year, month).await?.total_miles)
    }

    /// Walk the activity list newest first, adding up the target month.
    ///
    /// The walk stops at the first activity that started before the target
    /// month, so nothing past it is ever fetched, even if a later entry would
    /// have matched. Each activity's start date is read before the month
    /// check, so an unreadable date on a newer activity fails the whole query.
    pub async fn monthly_report(&self, user: &str, year: i32, month: u32) -> Result<MonthlyMiles> {
        let month_start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(MilesError::InvalidQuery { year, month })?;

        let profile = User::fetch(&self.source, user).await?;
        debug!(
            user = user,
            activities = profile.activities().len(),
            "Loaded activity list"
        );

        let mut report = MonthlyMiles {
            user: user.to_string(),
            user_name: profile.name().to_string(),
            year,
            month,
            total_miles: 0.0,
            activities_counted: 0,
            activities_inspected: 0,
        };

        for activity in profile.activities() {
            let started_at = activity.started_at(&self.source).await?;
            report.activities_inspected += 1;

            if started_at.date() < month_start {
                debug!(path = activity.path(), started_at = %started_at, "Reached activities before target month");
                break;
            }

            if started_at.year() == year && started_at.month() == month {
                report.total_miles += activity.miles(&self.source).await?;
                report.activities_counted += 1;
            }
        }

        Ok(report)
    }
}

/// Total miles for one user and month using the given configuration.
pub async fn monthly_miles(config: &Config, user: &str, year: i32, month: u32) -> Result<f64> {
    MonthlyMilesCalculator::new(config)?
        .monthly_miles(user, year, month)
        .await
}

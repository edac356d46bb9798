//! Worklist view types
//!
//! Named views, ad-hoc custom filters and the calendar ranges used by the
//! `date_range` filter.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::EngineError;
use super::leads::LeadStatus;

/// Named worklist view
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ViewName {
    All,
    Locked,
    Converted,
    Junk,
    NotQualified,
    Open,
    RecentlyCreated,
    RecentlyModified,
    Today,
    Unread,
    Unsubscribed,
}

impl Default for ViewName {
    fn default() -> Self {
        Self::All
    }
}

impl FromStr for ViewName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let view = match s.trim() {
            "" | "all" => Self::All,
            "locked" => Self::Locked,
            "converted" => Self::Converted,
            "junk" => Self::Junk,
            "not-qualified" => Self::NotQualified,
            "open" => Self::Open,
            "recently-created" => Self::RecentlyCreated,
            "recently-modified" => Self::RecentlyModified,
            "today" => Self::Today,
            "unread" => Self::Unread,
            "unsubscribed" => Self::Unsubscribed,
            other => {
                return Err(EngineError::validation(format!("unknown view '{other}'")));
            }
        };
        Ok(view)
    }
}

/// Calendar window applied to `created_at`, always half-open `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

impl DateRange {
    /// Resolve against `now` (UTC). Weeks start on Monday.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let week_start =
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let month_start = first_of_month(today);

        let (start, end) = match self {
            Self::Today => (today, today + Duration::days(1)),
            Self::Yesterday => (today - Duration::days(1), today),
            Self::ThisWeek => (week_start, week_start + Duration::days(7)),
            Self::LastWeek => (week_start - Duration::days(7), week_start),
            Self::ThisMonth => (month_start, next_month(month_start)),
            Self::LastMonth => (first_of_month(month_start - Duration::days(1)), month_start),
        };

        (midnight(start), midnight(end))
    }

    pub fn contains(self, now: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds(now);
        start <= at && at < end
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn next_month(month_start: NaiveDate) -> NaiveDate {
    // Day 32 of any month lands in the following one.
    first_of_month(month_start + Duration::days(32))
}

/// Ad-hoc filters, AND-combined. Unset or blank fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFilters {
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn today_and_yesterday_are_whole_days() {
        // Wednesday
        let now = at(2026, 3, 4, 15);

        assert_eq!(
            DateRange::Today.bounds(now),
            (at(2026, 3, 4, 0), at(2026, 3, 5, 0))
        );
        assert_eq!(
            DateRange::Yesterday.bounds(now),
            (at(2026, 3, 3, 0), at(2026, 3, 4, 0))
        );
    }

    #[test]
    fn weeks_start_on_monday() {
        let now = at(2026, 3, 4, 15);

        assert_eq!(
            DateRange::ThisWeek.bounds(now),
            (at(2026, 3, 2, 0), at(2026, 3, 9, 0))
        );
        assert_eq!(
            DateRange::LastWeek.bounds(now),
            (at(2026, 2, 23, 0), at(2026, 3, 2, 0))
        );
    }

    #[test]
    fn months_cross_year_boundaries() {
        let now = at(2026, 1, 20, 8);

        assert_eq!(
            DateRange::ThisMonth.bounds(now),
            (at(2026, 1, 1, 0), at(2026, 2, 1, 0))
        );
        assert_eq!(
            DateRange::LastMonth.bounds(now),
            (at(2025, 12, 1, 0), at(2026, 1, 1, 0))
        );
    }

    #[test]
    fn ranges_are_half_open() {
        let now = at(2026, 3, 4, 15);

        assert!(DateRange::Today.contains(now, at(2026, 3, 4, 0)));
        assert!(!DateRange::Today.contains(now, at(2026, 3, 5, 0)));
    }

    #[test]
    fn view_names_parse_from_kebab_case() {
        assert_eq!("not-qualified".parse::<ViewName>().ok(), Some(ViewName::NotQualified));
        assert_eq!("".parse::<ViewName>().ok(), Some(ViewName::All));
        assert!("archived".parse::<ViewName>().is_err());
    }
}

//! Game date parsing and Monday-anchored season week numbering

use crate::error::{Result, StatsError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Formats the stats feeds use for game dates
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%b %d, %Y", "%m/%d/%Y"];

/// Parse a provider game date into a UTC calendar date
///
/// Accepts plain dates ("2025-10-21", "OCT 21, 2025", "10/21/2025"), naive
/// timestamps ("2025-10-21T00:00:00") and RFC 3339 timestamps, which are
/// converted to UTC before the date is taken.
pub fn parse_game_date(raw: &str) -> Result<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(StatsError::invalid_date(raw, "missing date"));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc).date_naive());
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(timestamp.date());
    }

    Err(StatsError::invalid_date(raw, "unrecognized date format"))
}

/// How the first game date is moved onto a Monday to anchor week 1
///
/// The two feeds number weeks differently and downstream consumers key off
/// the existing numbering, so each feed keeps its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorAlignment {
    /// Monday of the first game's week (game-log feed)
    MondayOnOrBefore,
    /// First Monday on or after the first game (league schedule feed)
    MondayOnOrAfter,
}

impl AnchorAlignment {
    pub fn align(self, date: NaiveDate) -> NaiveDate {
        let weekday = date.weekday().num_days_from_monday() as i64;
        match self {
            AnchorAlignment::MondayOnOrBefore => date - Duration::days(weekday),
            AnchorAlignment::MondayOnOrAfter => date + Duration::days((7 - weekday) % 7),
        }
    }
}

/// Week numbering for one season, anchored at a Monday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    anchor: NaiveDate,
}

impl SeasonCalendar {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    /// Anchor the calendar on the earliest of `dates`; `None` when there are none
    pub fn from_dates<I>(dates: I, alignment: AnchorAlignment) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates.into_iter().min().map(|first| Self::new(alignment.align(first)))
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.anchor
    }

    /// 1-based week number, `None` for dates before the anchor
    pub fn week_of(&self, date: NaiveDate) -> Option<u32> {
        let days = (date - self.anchor).num_days();
        if days < 0 {
            return None;
        }
        Some((days / 7) as u32 + 1)
    }

    /// First and last day of a week (inclusive, six days apart)
    pub fn week_range(&self, week: u32) -> (NaiveDate, NaiveDate) {
        let start = self.anchor + Duration::weeks(week.saturating_sub(1) as i64);
        (start, start + Duration::days(6))
    }
}

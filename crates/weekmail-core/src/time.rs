//! Time types for calendar events.
//!
//! This module provides [`EventTime`] for representing event start/end times
//! (a specific datetime, an all-day date, or an opaque provider string), and
//! [`TimeWindow`] for defining the weekly query range.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Represents the time of a calendar event.
///
/// Calendar events can carry three kinds of time values:
/// - **DateTime**: A specific point in time (stored as UTC)
/// - **AllDay**: A date without a specific time (all-day events)
/// - **Raw**: A provider string that parsed as neither; rendered verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific datetime, stored in UTC.
    DateTime(DateTime<Utc>),
    /// An all-day event date (no specific time).
    AllDay(NaiveDate),
    /// An unparsable time value, passed through unchanged.
    Raw(String),
}

impl EventTime {
    /// Creates a new `EventTime::DateTime` from a UTC datetime.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    /// Creates a new `EventTime::AllDay` from a date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    /// Parses a provider time string.
    ///
    /// Tries RFC 3339 first (timed events), then `YYYY-MM-DD` (all-day
    /// events). Anything else is kept as [`EventTime::Raw`] so the digest
    /// can print it verbatim instead of dropping the event.
    pub fn parse(value: &str) -> Self {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Self::DateTime(dt.with_timezone(&Utc));
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Self::AllDay(date);
        }
        Self::Raw(value.to_string())
    }

    /// Returns `true` if this is an all-day event time.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the datetime if this is a `DateTime` variant.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Renders this time for the digest.
    ///
    /// Timed events use day, month name, year, 24-hour time in UTC.
    /// All-day dates keep the provider's `YYYY-MM-DD` form, and raw values
    /// pass through unchanged.
    pub fn render(&self) -> String {
        match self {
            Self::DateTime(dt) => dt.format("%d %B %Y, %H:%M").to_string(),
            Self::AllDay(date) => date.format("%Y-%m-%d").to_string(),
            Self::Raw(s) => s.clone(),
        }
    }
}

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Creates the window for the ISO week containing the given instant.
    ///
    /// The window runs from Monday 00:00:00 UTC of that week to the
    /// following Monday 00:00:00 UTC. Called on a Monday this is
    /// `[today 00:00Z, today + 7d 00:00Z)`.
    pub fn iso_week_containing(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let start = monday.and_hms_opt(0, 0, 0).expect("valid time").and_utc();
        Self {
            start,
            end: start + Duration::days(7),
        }
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn parse_rfc3339() {
            let et = EventTime::parse("2024-03-04T09:00:00Z");
            assert_eq!(et, EventTime::DateTime(utc(2024, 3, 4, 9, 0, 0)));
            assert!(!et.is_all_day());
        }

        #[test]
        fn parse_rfc3339_with_offset() {
            let et = EventTime::parse("2024-03-04T10:00:00+01:00");
            assert_eq!(et, EventTime::DateTime(utc(2024, 3, 4, 9, 0, 0)));
        }

        #[test]
        fn parse_all_day_date() {
            let et = EventTime::parse("2024-03-04");
            assert_eq!(et, EventTime::AllDay(date(2024, 3, 4)));
            assert!(et.is_all_day());
        }

        #[test]
        fn parse_garbage_kept_raw() {
            let et = EventTime::parse("sometime next week");
            assert_eq!(et, EventTime::Raw("sometime next week".to_string()));
        }

        #[test]
        fn render_datetime() {
            let et = EventTime::from_utc(utc(2024, 3, 4, 9, 0, 0));
            assert_eq!(et.render(), "04 March 2024, 09:00");
        }

        #[test]
        fn render_all_day() {
            let et = EventTime::from_date(date(2024, 3, 4));
            assert_eq!(et.render(), "2024-03-04");
        }

        #[test]
        fn render_raw_passthrough() {
            let et = EventTime::Raw("not-a-date".to_string());
            assert_eq!(et.render(), "not-a-date");
        }

        #[test]
        fn serde_roundtrip() {
            let et = EventTime::from_utc(utc(2024, 3, 4, 9, 0, 0));
            let json = serde_json::to_string(&et).unwrap();
            let parsed: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et, parsed);
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let start = utc(2024, 3, 4, 0, 0, 0);
            let end = utc(2024, 3, 11, 0, 0, 0);
            let window = TimeWindow::new(start, end);
            assert_eq!(window.duration(), Duration::days(7));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(utc(2024, 3, 11, 0, 0, 0), utc(2024, 3, 4, 0, 0, 0));
        }

        #[test]
        fn contains_half_open() {
            let window = TimeWindow::new(utc(2024, 3, 4, 0, 0, 0), utc(2024, 3, 11, 0, 0, 0));
            assert!(window.contains(utc(2024, 3, 4, 0, 0, 0)));
            assert!(window.contains(utc(2024, 3, 10, 23, 59, 59)));
            assert!(!window.contains(utc(2024, 3, 11, 0, 0, 0)));
            assert!(!window.contains(utc(2024, 3, 3, 23, 59, 59)));
        }

        #[test]
        fn iso_week_on_monday() {
            // 2024-03-04 is a Monday
            let window = TimeWindow::iso_week_containing(utc(2024, 3, 4, 15, 30, 0));
            assert_eq!(window.start, utc(2024, 3, 4, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 11, 0, 0, 0));
        }

        #[test]
        fn iso_week_midnight_monday() {
            let window = TimeWindow::iso_week_containing(utc(2024, 3, 4, 0, 0, 0));
            assert_eq!(window.start, utc(2024, 3, 4, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 11, 0, 0, 0));
        }

        #[test]
        fn iso_week_rolls_back_midweek() {
            // 2024-03-07 is a Thursday
            let window = TimeWindow::iso_week_containing(utc(2024, 3, 7, 9, 0, 0));
            assert_eq!(window.start, utc(2024, 3, 4, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 11, 0, 0, 0));
        }

        #[test]
        fn iso_week_on_sunday() {
            // 2024-03-10 is a Sunday, still the week starting Monday the 4th
            let window = TimeWindow::iso_week_containing(utc(2024, 3, 10, 23, 0, 0));
            assert_eq!(window.start, utc(2024, 3, 4, 0, 0, 0));
            assert_eq!(window.end, utc(2024, 3, 11, 0, 0, 0));
        }

        #[test]
        fn iso_week_across_year_boundary() {
            // 2026-01-01 is a Thursday; its ISO week starts 2025-12-29
            let window = TimeWindow::iso_week_containing(utc(2026, 1, 1, 12, 0, 0));
            assert_eq!(window.start, utc(2025, 12, 29, 0, 0, 0));
            assert_eq!(window.end, utc(2026, 1, 5, 0, 0, 0));
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and year arithmetic.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an ISO 8601 timestamp into UTC.
pub fn parse_utc(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Extract the calendar year from an ISO 8601 date string.
///
/// Falls back to the leading `YYYY` when the string is not full RFC3339.
pub fn year_of(date: &str) -> Option<i32> {
    if let Some(dt) = parse_utc(date) {
        return Some(dt.year());
    }
    date.get(..4).and_then(|y| y.parse().ok())
}

/// Extract the `YYYY-MM-DD` calendar date from an ISO 8601 date string.
pub fn date_of(date: &str) -> Option<NaiveDate> {
    date.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Unix timestamp of Jan 1 00:00:00 UTC of `year`, if representable.
pub fn year_start_ts(year: i32) -> Option<i64> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp())
}

/// Half-open unix-second bounds `[Jan 1 year, Jan 1 year+1)`.
///
/// `None` when either end falls outside the supported calendar range.
pub fn year_bounds(year: i32) -> Option<(i64, i64)> {
    let next = year.checked_add(1)?;
    Some((year_start_ts(year)?, year_start_ts(next)?))
}

//! Calendar utilities
//!
//! Pure day arithmetic over `chrono::NaiveDate`. Every function here is
//! deterministic given its arguments except [`today`], which reads the local
//! clock and is only called at the outermost entry points.
//!
//! Days travel on the wire in the canonical `YYYY-MM-DD` form. For that form,
//! lexicographic order and chronological order coincide, which is what lets
//! the rest of the engine compare days exactly.

use crate::error::StatsError;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};

/// Canonical day format used for storage and comparison
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used when writing `createdAt` back out
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Format a day as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Parse a canonical `YYYY-MM-DD` string.
///
/// Only the exact zero-padded form is accepted, so that
/// `format_date(parse_date(s)?) == s` holds for every accepted input.
pub fn parse_date(raw: &str) -> Result<NaiveDate, StatsError> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shaped {
        return Err(StatsError::MalformedDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|e| StatsError::MalformedDate(format!("{raw}: {e}")))
}

/// Parse a creation timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00.000Z`), a naive date-time, or a
/// bare canonical day (read as midnight). Offsets are not converted: the
/// wall-clock fields are kept as local time.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StatsError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive);
    }
    parse_date(raw).map(start_of_day)
}

/// Midnight at the start of `date`
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Signed number of days from `a` to `b`
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    b.signed_duration_since(a).num_days()
}

/// Add `n` days (negative to go back), saturating at the calendar limits
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(n)).unwrap_or(if n < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// Day of week with 0 = Sunday through 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Sunday that starts the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(day_of_week(date)))
}

/// Saturday that ends the week containing `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    add_days(week_start(date), 6)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Every day from `start` to `end`, inclusive and in order.
///
/// Returns an empty vector when `start` is after `end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Days covering the `weeks` weeks that end on `reference`, inclusive
pub fn last_weeks(reference: NaiveDate, weeks: u32) -> Vec<NaiveDate> {
    days_in_range(add_days(reference, -i64::from(weeks) * 7), reference)
}

/// Whether two days are the same calendar day
pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

/// Current local day. The only clock read in the crate.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Display form such as `Monday, Jan 7`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// Display form with year such as `Jan 7, 2026`
pub fn format_full_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Serde adapter for canonical day fields
pub mod serde_day {
    use super::{format_date, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for creation timestamps
pub mod serde_timestamp {
    use super::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

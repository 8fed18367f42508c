//! Date-only parsing and formatting.
//!
//! Task dates arrive from the store as strings that may carry a time part
//! (`2025-01-04T00:00:00Z`) or, for older records, a local layout. Only the
//! calendar date matters: nothing here ever shifts a date by a timezone.

use chrono::{DateTime, NaiveDate, TimeDelta};

/// ISO `YYYY-MM-DD` layout used for everything the engine emits.
pub const ISO_DATE: &str = "%Y-%m-%d";

const FALLBACK_LAYOUTS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Parse a date-only value.
///
/// A leading `YYYY-MM-DD` wins, whatever follows it. Otherwise RFC 3339
/// timestamps and a few common layouts are tried.
pub fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(prefix) = s.get(..10) {
        if is_iso_prefix(prefix) {
            if let Ok(d) = NaiveDate::parse_from_str(prefix, ISO_DATE) {
                return Some(d);
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    FALLBACK_LAYOUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a date-only value, falling back to `today` so that a single bad
/// record never takes the chart down.
pub fn parse_date_or(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw {
        Some(s) => parse_date_only(s).unwrap_or_else(|| {
            tracing::warn!(value = %s, "unparseable task date, using today");
            today
        }),
        None => today,
    }
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Shift a date by whole days. Out-of-range results keep the input date.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(date)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn is_iso_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// Serde helper for date-only fields: tolerant on input, ISO on output.
pub mod date_only {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_iso(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(super::parse_date_or(raw.as_deref(), super::today()))
    }
}

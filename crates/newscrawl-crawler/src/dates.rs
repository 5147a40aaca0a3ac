//! Timestamp parsing for feed entries and article cards.
//!
//! Each dialect tries a fixed, ordered list of formats; the first match wins
//! and a miss is `None`, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const RSS_OFFSET_FORMATS: &[&str] = &["%a, %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"];

// Zone names chrono cannot parse; all of them mean UTC here.
const RSS_UTC_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S GMT",
    "%a, %d %b %Y %H:%M:%S UTC",
    "%d %b %Y %H:%M:%S GMT",
];

const ISO_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an RSS `pubDate` (RFC 822 family).
#[must_use]
pub fn parse_rss_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in RSS_OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in RSS_UTC_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    tracing::debug!(raw, "could not parse RSS date");
    None
}

/// Parse an ISO 8601 timestamp (Atom `published`/`updated`, HTML `datetime`).
///
/// Timestamps without an offset are taken as UTC; a bare date is midnight UTC.
#[must_use]
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ISO_NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    tracing::debug!(raw, "could not parse ISO date");
    None
}

/// Parse a timestamp of unknown dialect: ISO first, then RSS.
#[must_use]
pub fn parse_any_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_iso_date(raw).or_else(|| parse_rss_date(raw))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn rss_rfc2822_with_offset() {
        assert_eq!(
            parse_rss_date("Tue, 02 Jan 2024 10:30:00 +0100"),
            Some(utc(2024, 1, 2, 9, 30, 0))
        );
    }

    #[test]
    fn rss_gmt_suffix() {
        assert_eq!(
            parse_rss_date("Tue, 02 Jan 2024 10:30:00 GMT"),
            Some(utc(2024, 1, 2, 10, 30, 0))
        );
    }

    #[test]
    fn rss_without_weekday() {
        assert_eq!(
            parse_rss_date("02 Jan 2024 10:30:00 +0000"),
            Some(utc(2024, 1, 2, 10, 30, 0))
        );
    }

    #[test]
    fn rss_garbage_is_none() {
        assert_eq!(parse_rss_date("yesterday-ish"), None);
        assert_eq!(parse_rss_date("   "), None);
    }

    #[test]
    fn iso_zulu_and_offset() {
        assert_eq!(
            parse_iso_date("2024-02-29T23:15:00Z"),
            Some(utc(2024, 2, 29, 23, 15, 0))
        );
        assert_eq!(
            parse_iso_date("2024-03-01T01:15:00+02:00"),
            Some(utc(2024, 2, 29, 23, 15, 0))
        );
    }

    #[test]
    fn iso_naive_and_date_only_are_utc() {
        assert_eq!(
            parse_iso_date("2024-05-06T07:08:09.123"),
            Some(utc(2024, 5, 6, 7, 8, 9) + chrono::Duration::milliseconds(123))
        );
        assert_eq!(parse_iso_date("2024-05-06"), Some(utc(2024, 5, 6, 0, 0, 0)));
    }

    #[test]
    fn any_date_falls_back_to_rss() {
        assert_eq!(
            parse_any_date("Mon, 01 Jan 2024 00:00:00 GMT"),
            Some(utc(2024, 1, 1, 0, 0, 0))
        );
        assert_eq!(parse_any_date("not a date"), None);
    }
}

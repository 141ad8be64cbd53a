//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Parse a front-matter date string as a calendar date
///
/// Accepts plain dates, date-times and RFC 3339 timestamps. The time part,
/// if any, is discarded.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y"];
    const DATETIME_FORMATS: [&str; 6] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 / ISO 8601 with offset, keep the author's calendar day
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}

/// Format a date as "January 15, 2024"
pub fn full_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Short relative label like "2y ago", "3mo ago", "5d ago" or "Today"
///
/// Compares the calendar fields one at a time, so 2023-12-31 is "1y ago"
/// on 2024-01-01.
pub fn relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let years = today.year() - date.year();
    let months = today.month() as i32 - date.month() as i32;
    let days = today.day() as i32 - date.day() as i32;

    if years > 0 {
        format!("{}y ago", years)
    } else if months > 0 {
        format!("{}mo ago", months)
    } else if days > 0 {
        format!("{}d ago", days)
    } else {
        "Today".to_string()
    }
}

/// Format a front-matter date for display
///
/// Unparseable input is returned unchanged.
pub fn format_date(raw: &str, today: NaiveDate, include_relative: bool) -> String {
    let Some(date) = parse_calendar_date(raw) else {
        return raw.to_string();
    };

    let full = full_date(date);
    if include_relative {
        format!("{} ({})", full, relative_label(date, today))
    } else {
        full
    }
}

/// Format a date in sitemap `lastmod` form
pub fn date_xml(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date(" 2024/01/15 "), Some(ymd(2024, 1, 15)));
        assert_eq!(
            parse_calendar_date("2024-01-15 10:30:00"),
            Some(ymd(2024, 1, 15))
        );
        assert_eq!(
            parse_calendar_date("2024-01-15T23:30:00-05:00"),
            Some(ymd(2024, 1, 15))
        );
        assert_eq!(
            parse_calendar_date("January 15, 2024"),
            Some(ymd(2024, 1, 15))
        );
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn test_full_date() {
        assert_eq!(full_date(ymd(2024, 1, 5)), "January 5, 2024");
    }

    #[test]
    fn test_relative_label() {
        let today = ymd(2024, 6, 10);
        assert_eq!(relative_label(ymd(2022, 6, 10), today), "2y ago");
        assert_eq!(relative_label(ymd(2024, 3, 20), today), "3mo ago");
        assert_eq!(relative_label(ymd(2024, 6, 3), today), "7d ago");
        assert_eq!(relative_label(today, today), "Today");
    }

    #[test]
    fn test_format_date() {
        let today = ymd(2024, 6, 10);
        assert_eq!(format_date("2024-06-01", today, false), "June 1, 2024");
        assert_eq!(
            format_date("2024-06-01", today, true),
            "June 1, 2024 (9d ago)"
        );
        assert_eq!(format_date("someday", today, true), "someday");
    }
}

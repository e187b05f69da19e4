//! Appointment date extraction.
//!
//! Recognises "today"/"tomorrow", weekday names (always the next occurrence
//! strictly after today), ISO `YYYY-MM-DD`, and US `MM/DD[/YYYY]` dates.
//! Falls back to tomorrow.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

/// Fixed weekday ordering used for the modular distance computation.
const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

struct DatePatterns {
    today: Regex,
    tomorrow: Regex,
    weekday: Regex,
    iso: Regex,
    us: Regex,
}

static DATE_PATTERNS: LazyLock<DatePatterns> = LazyLock::new(|| DatePatterns {
    today: Regex::new(r"(?i)\btoday\b").unwrap(),
    tomorrow: Regex::new(r"(?i)\btomorrow\b").unwrap(),
    weekday: Regex::new(r"(?i)\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\b")
        .unwrap(),
    iso: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap(),
    us: Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap(),
});

/// Next occurrence of the named weekday strictly after `today`.
///
/// If `today` already is that weekday the result is one week out.
pub fn next_weekday(today: NaiveDate, weekday_index: u32) -> NaiveDate {
    let current = today.weekday().num_days_from_sunday();
    let mut ahead = (weekday_index + 7 - current) % 7;
    if ahead == 0 {
        ahead = 7;
    }
    today + Duration::days(i64::from(ahead))
}

/// Find an explicit date reference, if any.
pub fn find_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let pats = &*DATE_PATTERNS;

    if pats.today.is_match(text) {
        return Some(today);
    }
    if pats.tomorrow.is_match(text) {
        return Some(today + Duration::days(1));
    }

    if let Some(caps) = pats.weekday.captures(text) {
        let name = caps.get(1)?.as_str().to_lowercase();
        if let Some(index) = WEEKDAYS.iter().position(|d| *d == name) {
            return Some(next_weekday(today, index as u32));
        }
    }

    if let Some(caps) = pats.iso.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = pats.us.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = match caps.get(3) {
            Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
            Some(y) => y.as_str().parse::<i32>().ok()?,
            None => today.year(),
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Extract a date, defaulting to tomorrow when nothing is recognised.
pub fn extract_date(text: &str, today: NaiveDate) -> NaiveDate {
    find_date(text, today).unwrap_or_else(|| today + Duration::days(1))
}

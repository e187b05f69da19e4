//! Appointment time extraction.
//!
//! Without an explicit am/pm marker, hours 1 through 8 are read as afternoon
//! (clinic hours), so "at 3" is 15:00 while "at 10" stays 10:00.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

/// Used when the utterance names no time.
pub const DEFAULT_TIME: (u32, u32) = (14, 0);

struct TimePatterns {
    oclock: Regex,
    meridiem: Regex,
    clock: Regex,
    bare_at: Regex,
}

static TIME_PATTERNS: LazyLock<TimePatterns> = LazyLock::new(|| TimePatterns {
    oclock: Regex::new(
        r"(?i)\b(\d{1,2})\s*o['’]?\s?clock(?:\s*(a\.m\.|p\.m\.|am\b|pm\b))?",
    )
    .unwrap(),
    meridiem: Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(a\.m\.|p\.m\.|am\b|pm\b)").unwrap(),
    clock: Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap(),
    bare_at: Regex::new(r"(?i)\bat\s+(\d{1,2})\b").unwrap(),
});

fn is_pm(marker: &str) -> bool {
    marker.to_lowercase().starts_with('p')
}

/// Convert a 12-hour clock reading with an explicit marker.
fn from_meridiem(hour: u32, minute: u32, pm: bool) -> Option<NaiveTime> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Apply the afternoon bias to an hour given without a marker.
fn from_bare_hour(hour: u32, minute: u32) -> Option<NaiveTime> {
    let hour24 = match hour {
        1..=8 => hour + 12,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Find an explicit time reference, if any.
pub fn find_time(text: &str) -> Option<NaiveTime> {
    let pats = &*TIME_PATTERNS;

    if let Some(caps) = pats.oclock.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let parsed = match caps.get(2) {
            Some(marker) => from_meridiem(hour, 0, is_pm(marker.as_str())),
            None => from_bare_hour(hour, 0),
        };
        if parsed.is_some() {
            return parsed;
        }
    }

    if let Some(caps) = pats.meridiem.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if let Some(time) = from_meridiem(hour, minute, is_pm(&caps[3])) {
            return Some(time);
        }
    }

    if let Some(caps) = pats.clock.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if let Some(time) = from_bare_hour(hour, minute) {
            return Some(time);
        }
    }

    for caps in pats.bare_at.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        // "at 3/15" is a date; "at 9:75" was already rejected as a clock reading.
        if text[whole.end()..].starts_with(['/', ':']) {
            continue;
        }
        let hour: u32 = caps[1].parse().ok()?;
        if let Some(time) = from_bare_hour(hour, 0) {
            return Some(time);
        }
    }

    None
}

/// Extract a time, defaulting to 14:00 when nothing is recognised.
pub fn extract_time(text: &str) -> NaiveTime {
    find_time(text).unwrap_or_else(|| {
        NaiveTime::from_hms_opt(DEFAULT_TIME.0, DEFAULT_TIME.1, 0).unwrap_or(NaiveTime::MIN)
    })
}

/// Zero-padded 24-hour `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

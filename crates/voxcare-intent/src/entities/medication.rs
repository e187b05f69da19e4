//! Medication name, strength, dosage, and frequency extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::is_filler;
use crate::types::MedicationRequest;

pub const UNSPECIFIED: &str = "unspecified";
pub const DEFAULT_DOSAGE: &str = "1 tablet";
pub const DEFAULT_FREQUENCY: &str = "once daily";

const STRENGTH: &str = r"(\d+(?:\.\d+)?\s*(?:(?:mcg|mg|ml|iu|g)\b|%))";
const LEAD_IN: &str = concat!(
    r"(?i)\b(?:add|adding|taking|take|prescribed|start|started|starting)\s+",
    r"(?:(?:a|an|the|my|new)\s+)*",
    r"(?:(?:medication|medicine|prescription)\s+)?",
    r"(?:(?:called|named)\s+)?",
    r"([a-z][a-z\-]*)",
);

struct MedicationPatterns {
    name_with_strength: Regex,
    name_only: Regex,
    strength: Regex,
    dosage: Regex,
}

static MEDICATION_PATTERNS: LazyLock<MedicationPatterns> = LazyLock::new(|| MedicationPatterns {
    name_with_strength: Regex::new(&format!(r"{}\s+{}", LEAD_IN, STRENGTH)).unwrap(),
    name_only: Regex::new(LEAD_IN).unwrap(),
    strength: Regex::new(&format!(r"(?i)\b{}", STRENGTH)).unwrap(),
    dosage: Regex::new(concat!(
        r"(?i)\b(\d+(?:\.\d+)?|1/2|one|two|three|four|half(?:\s+a)?|a\s+half)\s+",
        r"(tablets?|pills?|capsules?|puffs?|drops?|sprays?|units?|teaspoons?|patch(?:es)?)\b",
    ))
    .unwrap(),
});

/// Spoken frequency phrases and their canonical form. Longer phrases first.
const FREQUENCIES: &[(&str, &str)] = &[
    ("four times a day", "four times daily"),
    ("four times daily", "four times daily"),
    ("three times a day", "three times daily"),
    ("three times daily", "three times daily"),
    ("twice a day", "twice daily"),
    ("twice daily", "twice daily"),
    ("two times a day", "twice daily"),
    ("two times daily", "twice daily"),
    ("once a day", "once daily"),
    ("once daily", "once daily"),
    ("every morning", "every morning"),
    ("in the morning", "every morning"),
    ("every night", "at bedtime"),
    ("at night", "at bedtime"),
    ("at bedtime", "at bedtime"),
    ("before bed", "at bedtime"),
    ("once a week", "weekly"),
    ("weekly", "weekly"),
    ("as needed", "as needed"),
    ("when needed", "as needed"),
    ("daily", "once daily"),
    ("bid", "twice daily"),
    ("tid", "three times daily"),
    ("qid", "four times daily"),
    ("prn", "as needed"),
];

/// Canonical frequency for the first known phrase in `text`.
pub fn canonical_frequency(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    FREQUENCIES
        .iter()
        .find(|(phrase, _)| super::contains_word(&lower, phrase))
        .map(|(_, canonical)| *canonical)
}

fn normalize_strength(raw: &str) -> String {
    raw.split_whitespace().collect::<String>().to_lowercase()
}

fn normalize_dosage(count: &str, unit: &str) -> String {
    let count = count.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
    let count = match count.as_str() {
        "one" => "1".to_string(),
        "two" => "2".to_string(),
        "three" => "3".to_string(),
        "four" => "4".to_string(),
        "half" | "half a" | "a half" => "1/2".to_string(),
        other => other.to_string(),
    };
    let unit = unit.to_lowercase();
    let unit = if count == "1" || count == "1/2" {
        match unit.as_str() {
            "patches" => "patch".to_string(),
            u => u.strip_suffix('s').unwrap_or(u).to_string(),
        }
    } else {
        unit
    };
    format!("{} {}", count, unit)
}

/// Extract a complete medication request. Missing parts get defaults and are
/// listed in `defaulted`.
pub fn extract_medication(text: &str) -> MedicationRequest {
    let pats = &*MEDICATION_PATTERNS;
    let mut defaulted = Vec::new();

    let (name, strength) = match pats.name_with_strength.captures(text) {
        Some(caps) => (
            Some(caps[1].to_lowercase()),
            Some(normalize_strength(&caps[2])),
        ),
        None => {
            let name = pats
                .name_only
                .captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str()))
                .find(|n| !is_filler(n))
                .map(str::to_lowercase);
            let strength = pats
                .strength
                .captures(text)
                .map(|c| normalize_strength(&c[1]));
            (name, strength)
        }
    };

    let name = name.unwrap_or_else(|| {
        defaulted.push("name".to_string());
        UNSPECIFIED.to_string()
    });
    let strength = strength.unwrap_or_else(|| {
        defaulted.push("strength".to_string());
        UNSPECIFIED.to_string()
    });
    let dosage = match pats.dosage.captures(text) {
        Some(caps) => normalize_dosage(&caps[1], &caps[2]),
        None => {
            defaulted.push("dosage".to_string());
            DEFAULT_DOSAGE.to_string()
        }
    };
    let frequency = match canonical_frequency(text) {
        Some(f) => f.to_string(),
        None => {
            defaulted.push("frequency".to_string());
            DEFAULT_FREQUENCY.to_string()
        }
    };

    MedicationRequest {
        name,
        strength,
        dosage,
        frequency,
        defaulted,
    }
}

//! Visit reason extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::{capitalize_first, contains_word, is_filler};

/// Used when no reason can be found.
pub const DEFAULT_REASON: &str = "General";

static REASON_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:for|about|regarding)\s+(.+?)",
        r"(?:\s+(?:at|on|with|tomorrow|today)\b|[.,?!]|$)",
    ))
    .unwrap()
});

static DATE_OR_TIME_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:\d|today\b|tomorrow\b|tonight\b|next\b|this\b|noon\b",
        r"|(?:sun|mon|tues|wednes|thurs|fri|satur)day\b)",
    ))
    .unwrap()
});

/// Common visit reasons, most specific first.
const SYMPTOMS: &[&str] = &[
    "annual physical",
    "physical exam",
    "flu shot",
    "prescription refill",
    "blood work",
    "lab work",
    "sore throat",
    "back pain",
    "chest pain",
    "follow-up",
    "follow up",
    "check-up",
    "checkup",
    "check up",
    "headache",
    "migraine",
    "fever",
    "cough",
    "rash",
    "allergies",
    "vaccination",
    "vaccine",
    "refill",
    "consultation",
    "physical",
    "flu",
    "cold",
];

fn strip_leading_article(s: &str) -> &str {
    for article in ["a ", "an ", "the ", "my "] {
        match (s.get(..article.len()), s.get(article.len()..)) {
            (Some(head), Some(rest)) if !rest.is_empty() && head.eq_ignore_ascii_case(article) => {
                return rest;
            }
            _ => {}
        }
    }
    s
}

/// Find an explicit reason, if any.
///
/// A "for/about/regarding" clause wins unless what follows is only a date or
/// time ("for tomorrow", "for 3pm"); then a known symptom phrase is looked for.
pub fn find_reason(text: &str) -> Option<String> {
    for caps in REASON_CLAUSE.captures_iter(text) {
        let Some(clause) = caps.get(1) else { continue };
        let clause = strip_leading_article(clause.as_str().trim());
        if clause.is_empty() || is_filler(clause) || DATE_OR_TIME_START.is_match(clause) {
            continue;
        }
        return Some(capitalize_first(clause));
    }

    let lower = text.to_lowercase();
    SYMPTOMS
        .iter()
        .find(|s| contains_word(&lower, s))
        .map(|s| capitalize_first(s))
}

/// Extract a reason, defaulting to "General".
pub fn extract_reason(text: &str) -> String {
    find_reason(text).unwrap_or_else(|| DEFAULT_REASON.to_string())
}

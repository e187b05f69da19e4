//! Entity extraction from free-form utterances.
//!
//! Every extractor is total: the `find_*` variants return `None` when nothing
//! was recognised, and the `extract_*` variants substitute a documented
//! default so a caller can always build a complete downstream request.

pub mod date;
pub mod document;
pub mod medication;
pub mod provider;
pub mod reason;
pub mod routes;
pub mod time_parser;

pub use date::{extract_date, find_date, next_weekday};
pub use document::detect_document_type;
pub use medication::{canonical_frequency, extract_medication};
pub use provider::extract_provider_name;
pub use reason::{extract_reason, find_reason, DEFAULT_REASON};
pub use routes::{infer_role, resolve_route, RouteMatch};
pub use time_parser::{extract_time, find_time, format_hhmm, DEFAULT_TIME};

/// Byte offset of the first whole-word occurrence of `needle` in `haystack`.
///
/// Both sides are expected to be lowercase already. A match must not be
/// flanked by alphanumeric characters, so `"see"` does not match `"seen"`,
/// while `"what"` still matches `"what's"`.
pub(crate) fn word_position(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let at = start + offset;
        let end = at + needle.len();
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return Some(at);
        }
        start = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    word_position(haystack, needle).is_some()
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| contains_word(haystack, n))
}

/// Uppercase the first character only; the rest is left untouched.
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Words that can never be a provider name, medication name, or reason on their own.
pub(crate) const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "my", "me", "you", "us", "it", "to", "for", "at", "on", "in", "with",
    "about", "regarding", "some", "someone", "somebody", "anyone", "this", "that", "next",
    "doctor", "dr", "provider", "physician", "today", "tomorrow", "monday", "tuesday",
    "wednesday", "thursday", "friday", "saturday", "sunday", "new", "medication", "medicine",
    "medications", "medicines", "prescription", "appointment",
];

pub(crate) fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_position_respects_boundaries() {
        assert_eq!(word_position("i have seen it", "see"), None);
        assert_eq!(word_position("can i see it", "see"), Some(6));
        assert_eq!(word_position("what's up", "what"), Some(0));
        assert_eq!(word_position("the backups page", "backup"), None);
    }

    #[test]
    fn test_word_position_finds_later_occurrence() {
        // First "lab" is inside "labor", second is a whole word.
        assert_eq!(word_position("labor lab", "lab"), Some(6));
    }

    #[test]
    fn test_word_position_phrases() {
        assert!(contains_word("show me my labs please", "show me my"));
        assert!(!contains_word("show me mya", "show me my"));
    }

    #[test]
    fn test_word_position_empty_needle() {
        assert_eq!(word_position("anything", ""), None);
    }

    #[test]
    fn test_word_position_unicode() {
        assert_eq!(word_position("café lab", "lab"), Some(6));
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("sore throat"), "Sore throat");
        assert_eq!(capitalize_first("ANNUAL physical"), "ANNUAL physical");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn test_is_filler() {
        assert!(is_filler("My"));
        assert!(is_filler("tomorrow"));
        assert!(!is_filler("patel"));
    }
}

use std::sync::LazyLock;

use regex::Regex;

use super::{capitalize_first, is_filler};

static PROVIDER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "with Dr. Patel", "see doctor Nguyen", "with Lee"
        r"(?i)\b(?:with|see)\s+(?:dr\.?\s+|doctor\s+)?([a-z][a-z'\-]*)",
        // "Dr. Patel" anywhere
        r"(?i)\b(?:dr\.?|doctor)\s+([a-z][a-z'\-]*)",
        r"(?i)\bbook\s+me\s+(?:in\s+)?with\s+(?:dr\.?\s+|doctor\s+)?([a-z][a-z'\-]*)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid provider regex"))
    .collect()
});

/// Extract the provider's name from a booking request.
///
/// Returns `None` rather than guessing when only pronouns, articles, or
/// generic words like "doctor" follow the trigger phrase.
pub fn extract_provider_name(text: &str) -> Option<String> {
    for pattern in PROVIDER_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(name) = caps.get(1) else { continue };
            let name = name.as_str().trim_end_matches(['\'', '-']);
            if name.is_empty() || is_filler(name) {
                continue;
            }
            return Some(capitalize_first(name));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_title() {
        assert_eq!(
            extract_provider_name("Book with Dr. Patel tomorrow at 3").as_deref(),
            Some("Patel")
        );
        assert_eq!(
            extract_provider_name("see doctor nguyen on friday").as_deref(),
            Some("Nguyen")
        );
    }

    #[test]
    fn test_without_title() {
        assert_eq!(
            extract_provider_name("schedule me with lee next week").as_deref(),
            Some("Lee")
        );
    }

    #[test]
    fn test_title_anywhere() {
        assert_eq!(
            extract_provider_name("I need Dr Okafor for my knee").as_deref(),
            Some("Okafor")
        );
    }

    #[test]
    fn test_rejects_non_names() {
        assert_eq!(extract_provider_name("book with my doctor tomorrow"), None);
        assert_eq!(extract_provider_name("I need to see a doctor"), None);
        assert_eq!(extract_provider_name("see someone today"), None);
        assert_eq!(extract_provider_name("book an appointment"), None);
    }

    #[test]
    fn test_skips_rejected_candidate_and_keeps_looking() {
        // "with the" is rejected; "Dr. Shah" later in the sentence still counts.
        assert_eq!(
            extract_provider_name("book with the clinic, Dr. Shah please").as_deref(),
            Some("Shah")
        );
    }

    #[test]
    fn test_hyphenated_name() {
        assert_eq!(
            extract_provider_name("with Dr. Smith-Jones").as_deref(),
            Some("Smith-Jones")
        );
    }
}

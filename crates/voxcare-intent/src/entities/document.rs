use super::contains_any;

/// Document type label used when nothing more specific is mentioned.
pub const GENERIC_DOCUMENT: &str = "document";

const DOCUMENT_TYPES: &[(&[&str], &str)] = &[
    (&["insurance card", "insurance"], "insurance card"),
    (&["lab result", "lab results", "lab report", "test results"], "lab result"),
    (&["referral", "referral letter"], "referral"),
    (
        &["vaccination record", "immunization", "immunizations", "vaccine card"],
        "vaccination record",
    ),
    (&["x-ray", "xray", "mri", "ct scan", "imaging"], "imaging"),
    (&["prescription", "rx"], "prescription"),
    (&["driver's license", "drivers license", "license", "photo id", "id card"], "photo id"),
];

/// Classify the kind of document an upload request refers to.
pub fn detect_document_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    DOCUMENT_TYPES
        .iter()
        .find(|(phrases, _)| contains_any(&lower, phrases))
        .map(|(_, label)| *label)
        .unwrap_or(GENERIC_DOCUMENT)
}

//! Error types for the assistant runtime.

/// Errors from the speech output channel.
///
/// Synthesis and playback failures never leave the channel; they are logged
/// and published as `AssistantEvent::SpeechFailed`.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech request failed: {0}")]
    Request(String),
    #[error("Speech service returned status {0}")]
    Status(u16),
    #[error("Audio playback failed: {0}")]
    Playback(String),
    #[error("Speech output is disabled")]
    Disabled,
    #[error("Nothing to say")]
    EmptyText,
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Request(err.to_string())
    }
}

/// Errors from domain handlers. The dispatcher turns these into a spoken apology.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Handler unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_display() {
        assert_eq!(
            SpeechError::Request("connection refused".to_string()).to_string(),
            "Speech request failed: connection refused"
        );
        assert_eq!(
            SpeechError::Status(503).to_string(),
            "Speech service returned status 503"
        );
        assert_eq!(
            SpeechError::Playback("device busy".to_string()).to_string(),
            "Audio playback failed: device busy"
        );
        assert_eq!(SpeechError::Disabled.to_string(), "Speech output is disabled");
    }

    #[test]
    fn test_handler_error_display() {
        let err = HandlerError::Unavailable("billing backend offline".to_string());
        assert_eq!(err.to_string(), "Handler unavailable: billing backend offline");

        let err = HandlerError::InvalidRequest(String::new());
        assert_eq!(err.to_string(), "Invalid request: ");
    }

    #[test]
    fn test_errors_implement_debug() {
        assert!(format!("{:?}", SpeechError::Status(500)).contains("Status"));
        assert!(format!("{:?}", HandlerError::Unavailable("x".into())).contains("Unavailable"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status events emitted by an assistant session.
///
/// Published on the session's broadcast channel so a host UI (or a test) can
/// observe outcomes that are otherwise silent, most importantly speech
/// failures, which are never raised as errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AssistantEvent {
    // =========================================================================
    // Session lifecycle
    // =========================================================================
    /// The session was started and will speak, record, and suggest.
    SessionStarted { timestamp: DateTime<Utc> },

    /// The session was disposed; pending speech and timers were cancelled.
    SessionDisposed { timestamp: DateTime<Utc> },

    // =========================================================================
    // Turns
    // =========================================================================
    /// One utterance was resolved and recorded.
    TurnCompleted {
        prompt: String,
        intent: Option<String>,
        success: bool,
        route: Option<String>,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Speech
    // =========================================================================
    /// Synthesis started for an utterance.
    SpeechStarted {
        utterance_id: Uuid,
        text: String,
        timestamp: DateTime<Utc>,
    },

    /// Playback finished.
    SpeechCompleted {
        utterance_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A newer utterance (or dispose) cut this one off.
    SpeechCancelled {
        utterance_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Synthesis or playback failed. The user heard nothing.
    SpeechFailed {
        utterance_id: Uuid,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // =========================================================================
    // Suggestions
    // =========================================================================
    /// The idle timer fired and produced a follow-up suggestion.
    SuggestionOffered {
        text: String,
        timestamp: DateTime<Utc>,
    },
}

impl AssistantEvent {
    /// Returns the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AssistantEvent::SessionStarted { timestamp }
            | AssistantEvent::SessionDisposed { timestamp }
            | AssistantEvent::TurnCompleted { timestamp, .. }
            | AssistantEvent::SpeechStarted { timestamp, .. }
            | AssistantEvent::SpeechCompleted { timestamp, .. }
            | AssistantEvent::SpeechCancelled { timestamp, .. }
            | AssistantEvent::SpeechFailed { timestamp, .. }
            | AssistantEvent::SuggestionOffered { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a stable event name for logging and UI wiring.
    pub fn event_name(&self) -> &'static str {
        match self {
            AssistantEvent::SessionStarted { .. } => "session_started",
            AssistantEvent::SessionDisposed { .. } => "session_disposed",
            AssistantEvent::TurnCompleted { .. } => "turn_completed",
            AssistantEvent::SpeechStarted { .. } => "speech_started",
            AssistantEvent::SpeechCompleted { .. } => "speech_completed",
            AssistantEvent::SpeechCancelled { .. } => "speech_cancelled",
            AssistantEvent::SpeechFailed { .. } => "speech_failed",
            AssistantEvent::SuggestionOffered { .. } => "suggestion_offered",
        }
    }
}

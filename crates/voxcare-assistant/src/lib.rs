//! Dispatch, memory, speech, and idle suggestions for the VoxCare assistant.
//!
//! [`VoiceAssistant`] is the entry point: it takes a raw utterance plus the
//! caller's screen context and role, and returns a [`Turn`] describing what to
//! say and where to go.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod memory;
pub mod session;
pub mod speech;
pub mod suggestion;

pub use dispatcher::{Dispatch, DispatchInput, Dispatcher};
pub use error::{HandlerError, SpeechError};
pub use handler::{DomainHandler, HandlerRegistry, HandlerRequest, Outcome};
pub use memory::{IntentLogEntry, SessionMemory};
pub use session::{Turn, VoiceAssistant};
pub use speech::{AudioPlayer, HttpSynthesizer, SilentPlayer, SpeechChannel, Synthesizer};
pub use suggestion::{SuggestionEngine, SuggestionRule, SuggestionState};

//! Utterance understanding for the voice assistant.
//!
//! Two independent interpreters share the entity extractors: the keyword
//! [`IntentClassifier`] for staff/owner portal domains, and the
//! [`CommandParser`] for structured patient-facing commands.

pub mod classifier;
pub mod command;
pub mod entities;
pub mod types;

pub use classifier::{Domain, IntentClassifier, IntentRule};
pub use command::{appointment_request, CommandParser, DetectionRule};
pub use entities::RouteMatch;
pub use types::{
    AppointmentRequest, CommandKind, DocumentUpload, IntentTag, MedicationRequest, ParsedCommand,
};

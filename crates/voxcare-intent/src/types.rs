use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// =============================================================================
// IntentTag
// =============================================================================

/// Dotted `domain.action` label produced by the classifier, or the
/// `"unclassified"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentTag(String);

impl IntentTag {
    pub const UNCLASSIFIED: &'static str = "unclassified";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn unclassified() -> Self {
        Self(Self::UNCLASSIFIED.to_string())
    }

    pub fn is_unclassified(&self) -> bool {
        self.0 == Self::UNCLASSIFIED
    }

    /// Part before the first dot; the whole tag when there is no dot.
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or(self.0.as_str(), |(d, _)| d)
    }

    pub fn action(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, a)| a)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntentTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// CommandKind
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum CommandKind {
    Navigate,
    BookAppointment,
    AddMedication,
    UploadDocument,
    CheckAppointments,
    CheckMedications,
    GeneralQuery,
}

impl CommandKind {
    /// Kinds that ask the portal to do something, as opposed to answer something.
    pub fn is_task(self) -> bool {
        matches!(
            self,
            CommandKind::Navigate
                | CommandKind::BookAppointment
                | CommandKind::AddMedication
                | CommandKind::UploadDocument
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Navigate => "navigate",
            CommandKind::BookAppointment => "book_appointment",
            CommandKind::AddMedication => "add_medication",
            CommandKind::UploadDocument => "upload_document",
            CommandKind::CheckAppointments => "check_appointments",
            CommandKind::CheckMedications => "check_medications",
            CommandKind::GeneralQuery => "general_query",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entity payloads
// =============================================================================

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}

/// Entities of a `book_appointment` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    /// `None` means "first available provider".
    pub provider_name: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub reason: String,
    /// Fields that were not said and got a default instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<String>,
}

impl AppointmentRequest {
    pub fn was_defaulted(&self, field: &str) -> bool {
        self.defaulted.iter().any(|f| f == field)
    }
}

/// Entities of an `add_medication` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub name: String,
    pub strength: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<String>,
}

/// Entities of an `upload_document` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub document_type: String,
}

// =============================================================================
// ParsedCommand
// =============================================================================

/// A structured command. `page` is set only for `navigate`; `parsed` only for
/// the other kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub command: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,
}

impl ParsedCommand {
    pub fn navigate(page: impl Into<String>) -> Self {
        Self {
            command: CommandKind::Navigate,
            page: Some(page.into()),
            parsed: None,
        }
    }

    /// Build a non-navigation command carrying serialized entities.
    pub fn with_entities<T: Serialize>(command: CommandKind, entities: &T) -> Self {
        debug_assert!(command != CommandKind::Navigate);
        Self {
            command,
            page: None,
            parsed: serde_json::to_value(entities).ok(),
        }
    }

    /// Free-form question carrying `{"query": text}`.
    pub fn query(command: CommandKind, text: &str) -> Self {
        Self::with_entities(command, &serde_json::json!({ "query": text.trim() }))
    }

    fn entities<T: for<'de> Deserialize<'de>>(&self, kind: CommandKind) -> Option<T> {
        if self.command != kind {
            return None;
        }
        self.parsed
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn appointment(&self) -> Option<AppointmentRequest> {
        self.entities(CommandKind::BookAppointment)
    }

    pub fn medication(&self) -> Option<MedicationRequest> {
        self.entities(CommandKind::AddMedication)
    }

    pub fn document(&self) -> Option<DocumentUpload> {
        self.entities(CommandKind::UploadDocument)
    }

    /// The `query` text of a query-kind command.
    pub fn query_text(&self) -> Option<&str> {
        self.parsed.as_ref()?.get("query")?.as_str()
    }
}

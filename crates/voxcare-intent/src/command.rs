//! Structured command parsing for patient-facing requests.
//!
//! Detection runs through an ordered list of [`DetectionRule`]s. The order
//! encodes precedence (navigation, booking, medication, upload, then
//! questions) and each rule may carry a veto for phrasing that belongs to an
//! earlier kind even when that kind did not fire. For example "show my
//! appointments" is never a booking, whether or not a route resolves.

use chrono::{Local, NaiveDate};
use tracing::debug;
use voxcare_core::{Role, RouteTable};

use crate::entities::{
    self, contains_any, contains_word, detect_document_type, extract_medication, infer_role,
    resolve_route, RouteMatch,
};
use crate::types::{AppointmentRequest, CommandKind, DocumentUpload, ParsedCommand};

/// An utterance prepared once for every detector.
pub struct Utterance<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub role: Role,
    pub route: Option<RouteMatch>,
}

impl<'a> Utterance<'a> {
    pub fn new(raw: &'a str, role: Option<Role>, routes: &RouteTable) -> Self {
        let role = role.unwrap_or_else(|| infer_role(raw));
        Self {
            raw,
            lower: raw.to_lowercase(),
            role,
            route: resolve_route(raw, role, routes),
        }
    }
}

type Detector = fn(&Utterance<'_>) -> bool;

pub struct DetectionRule {
    pub kind: CommandKind,
    detect: Detector,
    veto: Option<Detector>,
}

impl DetectionRule {
    pub fn claims(&self, utterance: &Utterance<'_>) -> bool {
        (self.detect)(utterance) && !self.veto.is_some_and(|veto| veto(utterance))
    }
}

// =============================================================================
// Detectors
// =============================================================================

const NAV_PHRASES: &[&str] = &[
    "show me my",
    "show me",
    "show",
    "go to",
    "take me to",
    "navigate to",
    "open",
    "bring up",
    "pull up",
];

/// A resolvable route keyword plus either navigation phrasing or a
/// possessive directly in front of it ("my labs").
fn is_navigation(u: &Utterance<'_>) -> bool {
    let Some(route) = &u.route else {
        return false;
    };
    if contains_any(&u.lower, NAV_PHRASES) {
        return true;
    }
    u.lower
        .get(..route.position)
        .and_then(|before| before.split_whitespace().next_back())
        .is_some_and(|word| word.trim_matches(|c: char| !c.is_alphanumeric()) == "my")
}

fn is_booking(u: &Utterance<'_>) -> bool {
    contains_any(&u.lower, &["book", "schedule", "see", "visit"])
        || contains_any(
            &u.lower,
            &["make an appointment", "set up an appointment", "need an appointment"],
        )
}

fn is_appointment_listing(u: &Utterance<'_>) -> bool {
    contains_word(&u.lower, "show") || u.lower.contains("my appointments")
}

const MEDICATION_VERBS: &[&str] = &["add", "taking", "take", "prescribed", "start", "started"];
const MEDICATION_NOUNS: &[&str] = &[
    "medication",
    "medications",
    "medicine",
    "meds",
    "prescription",
    "pill",
    "pills",
];

fn is_medication_management(u: &Utterance<'_>) -> bool {
    if !contains_any(&u.lower, MEDICATION_VERBS) {
        return false;
    }
    contains_any(&u.lower, MEDICATION_NOUNS)
        || !extract_medication(u.raw)
            .defaulted
            .iter()
            .any(|f| f == "strength")
}

fn is_upload(u: &Utterance<'_>) -> bool {
    contains_any(&u.lower, &["upload", "scan", "attach"])
}

fn is_question(u: &Utterance<'_>) -> bool {
    contains_any(
        &u.lower,
        &[
            "what", "when", "which", "how", "do i", "is my", "are my", "list", "check", "view",
            "show",
        ],
    ) || u.lower.trim_end().ends_with('?')
}

fn question_kind(u: &Utterance<'_>) -> CommandKind {
    if contains_any(&u.lower, &["appointment", "appointments", "visit", "visits"]) {
        CommandKind::CheckAppointments
    } else if contains_any(
        &u.lower,
        &["medication", "medications", "meds", "prescriptions", "pills"],
    ) {
        CommandKind::CheckMedications
    } else {
        CommandKind::GeneralQuery
    }
}

// =============================================================================
// Parser
// =============================================================================

pub struct CommandParser {
    routes: RouteTable,
    rules: Vec<DetectionRule>,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(RouteTable::default())
    }
}

impl CommandParser {
    pub fn new(routes: RouteTable) -> Self {
        let rules = vec![
            DetectionRule {
                kind: CommandKind::Navigate,
                detect: is_navigation,
                veto: None,
            },
            DetectionRule {
                kind: CommandKind::BookAppointment,
                detect: is_booking,
                veto: Some(is_appointment_listing),
            },
            DetectionRule {
                kind: CommandKind::AddMedication,
                detect: is_medication_management,
                veto: None,
            },
            DetectionRule {
                kind: CommandKind::UploadDocument,
                detect: is_upload,
                veto: None,
            },
            // Refined to check_appointments / check_medications after detection.
            DetectionRule {
                kind: CommandKind::GeneralQuery,
                detect: is_question,
                veto: None,
            },
        ];
        Self { routes, rules }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn rules(&self) -> &[DetectionRule] {
        &self.rules
    }

    /// Parse against today's local date.
    pub fn parse(&self, text: &str, role: Option<Role>) -> Option<ParsedCommand> {
        self.parse_on(text, role, Local::now().date_naive())
    }

    /// Parse with an explicit "today" for relative dates.
    pub fn parse_on(
        &self,
        text: &str,
        role: Option<Role>,
        today: NaiveDate,
    ) -> Option<ParsedCommand> {
        if text.trim().is_empty() {
            return None;
        }
        let utterance = Utterance::new(text, role, &self.routes);
        let rule = self.rules.iter().find(|r| r.claims(&utterance))?;

        let command = match rule.kind {
            CommandKind::Navigate => {
                let route = utterance.route.as_ref()?;
                ParsedCommand::navigate(route.keyword.clone())
            }
            CommandKind::BookAppointment => ParsedCommand::with_entities(
                CommandKind::BookAppointment,
                &appointment_request(text, today),
            ),
            CommandKind::AddMedication => {
                ParsedCommand::with_entities(CommandKind::AddMedication, &extract_medication(text))
            }
            CommandKind::UploadDocument => ParsedCommand::with_entities(
                CommandKind::UploadDocument,
                &DocumentUpload {
                    document_type: detect_document_type(text).to_string(),
                },
            ),
            _ => ParsedCommand::query(question_kind(&utterance), text),
        };

        debug!(command = %command.command, role = %utterance.role, "Command parsed");
        Some(command)
    }
}

/// Build a complete appointment request, noting every guessed field.
pub fn appointment_request(text: &str, today: NaiveDate) -> AppointmentRequest {
    let mut defaulted = Vec::new();
    let date = entities::find_date(text, today).unwrap_or_else(|| {
        defaulted.push("date".to_string());
        entities::extract_date(text, today)
    });
    let time = entities::find_time(text).unwrap_or_else(|| {
        defaulted.push("time".to_string());
        entities::extract_time(text)
    });
    let reason = entities::find_reason(text).unwrap_or_else(|| {
        defaulted.push("reason".to_string());
        entities::DEFAULT_REASON.to_string()
    });

    AppointmentRequest {
        provider_name: entities::extract_provider_name(text),
        date,
        time,
        reason,
        defaulted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Sunday.
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn parse(text: &str, role: Option<Role>) -> Option<ParsedCommand> {
        CommandParser::default().parse_on(text, role, today())
    }

    #[test]
    fn test_book_with_provider_tomorrow() {
        let cmd = parse("Book with Dr. Patel tomorrow at 3", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::BookAppointment);
        let appt = cmd.appointment().unwrap();
        assert_eq!(appt.provider_name.as_deref(), Some("Patel"));
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(entities::format_hhmm(appt.time), "15:00");
        assert_eq!(appt.reason, "General");
        assert_eq!(appt.defaulted, vec!["reason"]);

        let parsed = cmd.parsed.unwrap();
        assert_eq!(parsed["date"], "2026-10-19");
        assert_eq!(parsed["time"], "15:00");
    }

    #[test]
    fn test_booking_defaults() {
        let cmd = parse("I want to book an appointment", None).unwrap();
        let appt = cmd.appointment().unwrap();
        assert_eq!(appt.provider_name, None);
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(entities::format_hhmm(appt.time), "14:00");
        assert_eq!(appt.defaulted, vec!["date", "time", "reason"]);
    }

    #[test]
    fn test_add_medication() {
        let cmd = parse("Add metformin 500mg once daily", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::AddMedication);
        let med = cmd.medication().unwrap();
        assert_eq!(med.name, "metformin");
        assert_eq!(med.strength, "500mg");
        assert_eq!(med.dosage, "1 tablet");
        assert_eq!(med.frequency, "once daily");
    }

    #[test]
    fn test_navigate_admin_invoices() {
        let cmd = parse("Show me invoices", Some(Role::Admin)).unwrap();
        assert_eq!(cmd.command, CommandKind::Navigate);
        assert_eq!(cmd.page.as_deref(), Some("invoices"));
        assert!(cmd.parsed.is_none());
    }

    #[test]
    fn test_navigate_infers_role() {
        let cmd = parse("Show me invoices", None).unwrap();
        assert_eq!(cmd.page.as_deref(), Some("invoices"));
    }

    #[test]
    fn test_possessive_navigation() {
        let cmd = parse("my lab results please", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::Navigate);
        assert_eq!(cmd.page.as_deref(), Some("labs"));
    }

    #[test]
    fn test_possessive_must_be_whole_word() {
        let cmd = parse("economy billing", Some(Role::Patient));
        assert_ne!(cmd.map(|c| c.command), Some(CommandKind::Navigate));

        let cmd = parse("and my billing", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::Navigate);
        assert_eq!(cmd.page.as_deref(), Some("billing"));
    }

    #[test]
    fn test_show_my_appointments_never_books() {
        let cmd = parse("show my appointments", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::Navigate);

        // Same phrasing with no route available is a question, not a booking.
        let parser = CommandParser::new(RouteTable::empty());
        let cmd = parser
            .parse_on("show my appointments to see Dr. Lee", Some(Role::Patient), today())
            .unwrap();
        assert_eq!(cmd.command, CommandKind::CheckAppointments);
    }

    #[test]
    fn test_booking_mentioning_appointment_is_not_navigation() {
        let cmd = parse("schedule an appointment for my checkup on friday", Some(Role::Patient))
            .unwrap();
        assert_eq!(cmd.command, CommandKind::BookAppointment);
        let appt = cmd.appointment().unwrap();
        assert_eq!(appt.reason, "Checkup");
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 10, 23).unwrap());
    }

    #[test]
    fn test_upload_document() {
        let cmd = parse("upload my insurance card", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::UploadDocument);
        assert_eq!(cmd.document().unwrap().document_type, "insurance card");
    }

    #[test]
    fn test_questions() {
        let cmd = parse("when is my next appointment?", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::CheckAppointments);
        assert_eq!(cmd.query_text(), Some("when is my next appointment?"));

        let cmd = parse("what meds am I on", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::CheckMedications);

        let cmd = parse("what is my copay", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::GeneralQuery);
    }

    #[test]
    fn test_unparseable() {
        assert!(parse("", None).is_none());
        assert!(parse("hello there", Some(Role::Patient)).is_none());
    }

    #[test]
    fn test_medication_by_strength_alone() {
        let cmd = parse("I started lisinopril 10mg", Some(Role::Patient)).unwrap();
        assert_eq!(cmd.command, CommandKind::AddMedication);
        assert_eq!(cmd.medication().unwrap().name, "lisinopril");
    }

    #[test]
    fn test_rule_order() {
        let kinds: Vec<_> = CommandParser::default().rules().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::Navigate,
                CommandKind::BookAppointment,
                CommandKind::AddMedication,
                CommandKind::UploadDocument,
                CommandKind::GeneralQuery,
            ]
        );
    }
}

//! Routes a classified intent or parsed command to the code that answers it.
//!
//! Every path ends in something the user sees or hears: unmatched intents
//! and general questions go to the fallback reply, and handler errors become
//! an apology.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use voxcare_core::{Role, RouteTable};
use voxcare_intent::entities::infer_role;
use voxcare_intent::{
    AppointmentRequest, CommandKind, IntentTag, MedicationRequest, ParsedCommand,
};

use crate::handler::{FallbackHandler, HandlerRegistry, HandlerRequest, Outcome};

/// What the dispatcher was asked to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchInput {
    Intent(IntentTag),
    Command(ParsedCommand),
    Unrecognized,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub outcome: Outcome,
    /// Whether the input was confidently resolved.
    pub success: bool,
    /// Intent tag or command kind, for the session log.
    pub intent_label: Option<String>,
}

impl Dispatch {
    fn resolved(outcome: Outcome, label: impl Into<String>) -> Self {
        Self {
            outcome,
            success: true,
            intent_label: Some(label.into()),
        }
    }

    fn fallback(context: Option<&str>, label: Option<String>) -> Self {
        Self {
            outcome: Outcome::speak(FallbackHandler::respond(context)),
            success: false,
            intent_label: label,
        }
    }
}

/// "Monday, October 19"
pub fn speak_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}

/// "3:00 PM"
pub fn speak_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn booking_confirmation(appt: &AppointmentRequest) -> String {
    let provider = match &appt.provider_name {
        Some(name) => format!("Dr. {}", name),
        None => "the first available provider".to_string(),
    };
    let mut text = format!(
        "Booking {} on {} at {}",
        provider,
        speak_date(appt.date),
        speak_time(appt.time)
    );
    if !appt.was_defaulted("reason") {
        text.push_str(&format!(" for {}", appt.reason.to_lowercase()));
    }
    text.push('.');

    let guessed: Vec<&str> = ["date", "time"]
        .into_iter()
        .filter(|f| appt.was_defaulted(f))
        .collect();
    if !guessed.is_empty() {
        text.push_str(&format!(
            " You didn't say a {}, so I picked one. Tell me if you'd like a different one.",
            guessed.join(" or ")
        ));
    }
    text
}

fn medication_confirmation(med: &MedicationRequest) -> String {
    if med.defaulted.iter().any(|f| f == "name") {
        return "Which medication would you like to add?".to_string();
    }
    let strength = if med.defaulted.iter().any(|f| f == "strength") {
        String::new()
    } else {
        format!(" {}", med.strength)
    };
    format!(
        "Adding {}{}, {} {}.",
        med.name, strength, med.dosage, med.frequency
    )
}

pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    pub async fn dispatch(
        &self,
        input: DispatchInput,
        request: &HandlerRequest,
        routes: &RouteTable,
    ) -> Dispatch {
        match input {
            DispatchInput::Intent(tag) => self.dispatch_intent(tag, request).await,
            DispatchInput::Command(command) => Self::dispatch_command(command, request, routes),
            DispatchInput::Unrecognized => Dispatch::fallback(request.context.as_deref(), None),
        }
    }

    async fn dispatch_intent(&self, tag: IntentTag, request: &HandlerRequest) -> Dispatch {
        let context = request.context.as_deref();
        if tag.is_unclassified() {
            return Dispatch::fallback(context, None);
        }
        let Some(handler) = self.registry.get(tag.domain()) else {
            debug!(tag = %tag, "No handler registered for intent domain");
            return Dispatch::fallback(context, Some(tag.to_string()));
        };

        match handler.handle(&tag, request).await {
            Ok(outcome) => Dispatch::resolved(outcome, tag.to_string()),
            Err(e) => {
                warn!(tag = %tag, error = %e, "Domain handler failed");
                Dispatch {
                    outcome: Outcome::speak(
                        "Sorry, I couldn't complete that request. Please try again.",
                    ),
                    success: false,
                    intent_label: Some(tag.to_string()),
                }
            }
        }
    }

    fn dispatch_command(
        command: ParsedCommand,
        request: &HandlerRequest,
        routes: &RouteTable,
    ) -> Dispatch {
        let role = request.role.unwrap_or_else(|| infer_role(&request.text));
        let label = command.command.to_string();
        let context = request.context.as_deref();

        match command.command {
            CommandKind::Navigate => {
                let target = command
                    .page
                    .as_deref()
                    .and_then(|page| routes.lookup_any(role, page).map(|(_, path)| (page, path)));
                match target {
                    Some((page, path)) => Dispatch::resolved(
                        Outcome::navigate(path, format!("Opening {}.", page)),
                        label,
                    ),
                    None => Dispatch::fallback(context, Some(label)),
                }
            }
            CommandKind::BookAppointment => match command.appointment() {
                Some(appt) => {
                    let text = booking_confirmation(&appt);
                    Dispatch::resolved(Outcome::Command { command, text }, label)
                }
                None => Dispatch::fallback(context, Some(label)),
            },
            CommandKind::AddMedication => match command.medication() {
                Some(med) => {
                    let text = medication_confirmation(&med);
                    Dispatch::resolved(Outcome::Command { command, text }, label)
                }
                None => Dispatch::fallback(context, Some(label)),
            },
            CommandKind::UploadDocument => {
                let kind = command
                    .document()
                    .map(|d| d.document_type)
                    .unwrap_or_else(|| "document".to_string());
                let text = format!("Ready to upload your {}. Choose the file to attach.", kind);
                Dispatch::resolved(Outcome::Command { command, text }, label)
            }
            CommandKind::CheckAppointments => Self::check_page(role, routes, "appointments", label),
            CommandKind::CheckMedications => Self::check_page(role, routes, "medications", label),
            _ => Dispatch::fallback(context, Some(label)),
        }
    }

    fn check_page(role: Role, routes: &RouteTable, page: &str, label: String) -> Dispatch {
        let outcome = match routes.lookup(role, page) {
            Some(path) => Outcome::navigate(path, format!("Here are your {}.", page)),
            None => Outcome::speak(format!("I can't show {} from this account.", page)),
        };
        Dispatch::resolved(outcome, label)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::HandlerError;
    use crate::handler::DomainHandler;

    struct BrokenHandler;

    #[async_trait]
    impl DomainHandler for BrokenHandler {
        fn domain(&self) -> &'static str {
            "billing"
        }

        fn describe(&self) -> &'static str {
            "Always fails"
        }

        async fn handle(
            &self,
            _tag: &IntentTag,
            _request: &HandlerRequest,
        ) -> Result<Outcome, HandlerError> {
            Err(HandlerError::Unavailable("billing service down".to_string()))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(HandlerRegistry::with_portal_defaults(&RouteTable::default()))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(text: &str, context: Option<&str>, role: Option<Role>) -> HandlerRequest {
        HandlerRequest::new(text).with_context(context).with_role(role)
    }

    #[tokio::test]
    async fn test_overdue_intent_produces_speech() {
        let d = dispatcher();
        let result = d
            .dispatch(
                DispatchInput::Intent(IntentTag::new("billing.overdueCheck")),
                &request("what's our overdue accounts", Some("billing"), Some(Role::Admin)),
                &RouteTable::default(),
            )
            .await;
        assert!(result.success);
        assert!(!result.outcome.text().is_empty());
        assert_eq!(result.intent_label.as_deref(), Some("billing.overdueCheck"));
    }

    #[tokio::test]
    async fn test_unclassified_and_unknown_domain_fall_back() {
        let d = dispatcher();
        let req = request("sing a song", Some("billing"), None);
        let routes = RouteTable::default();

        let result = d
            .dispatch(DispatchInput::Intent(IntentTag::unclassified()), &req, &routes)
            .await;
        assert!(!result.success);
        assert!(result.outcome.text().starts_with("You can ask about billing"));

        let result = d
            .dispatch(DispatchInput::Intent(IntentTag::new("pharmacy.refill")), &req, &routes)
            .await;
        assert!(!result.success);
        assert_eq!(result.intent_label.as_deref(), Some("pharmacy.refill"));

        let result = d.dispatch(DispatchInput::Unrecognized, &req, &routes).await;
        assert!(!result.success);
        assert!(!result.outcome.text().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_becomes_apology() {
        let mut registry = HandlerRegistry::new();
        registry.register(Arc::new(BrokenHandler));
        let d = Dispatcher::new(registry);
        let result = d
            .dispatch(
                DispatchInput::Intent(IntentTag::new("billing.summary")),
                &request("billing summary", None, None),
                &RouteTable::default(),
            )
            .await;
        assert!(!result.success);
        assert!(result.outcome.text().starts_with("Sorry"));
    }

    #[tokio::test]
    async fn test_navigate_command_resolves_path() {
        let result = dispatcher()
            .dispatch(
                DispatchInput::Command(ParsedCommand::navigate("invoices")),
                &request("show me invoices", None, Some(Role::Admin)),
                &RouteTable::default(),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.outcome.route(), Some("/admin/invoices"));
        assert_eq!(result.intent_label.as_deref(), Some("navigate"));
    }

    #[tokio::test]
    async fn test_navigate_to_unknown_page_falls_back() {
        let result = dispatcher()
            .dispatch(
                DispatchInput::Command(ParsedCommand::navigate("vitals")),
                &request("open vitals", None, Some(Role::Patient)),
                &RouteTable::default(),
            )
            .await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_booking_confirmation_is_spoken_naturally() {
        let appt = AppointmentRequest {
            provider_name: Some("Patel".into()),
            date: day(2026, 10, 19),
            time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            reason: "General".into(),
            defaulted: vec!["reason".into()],
        };
        let command = ParsedCommand::with_entities(CommandKind::BookAppointment, &appt);
        let result = dispatcher()
            .dispatch(
                DispatchInput::Command(command),
                &request("Book with Dr. Patel tomorrow at 3", None, Some(Role::Patient)),
                &RouteTable::default(),
            )
            .await;
        assert!(result.success);
        assert_eq!(
            result.outcome.text(),
            "Booking Dr. Patel on Monday, October 19 at 3:00 PM."
        );
        assert!(matches!(result.outcome, Outcome::Command { .. }));
    }

    #[test]
    fn test_booking_confirmation_names_guessed_fields() {
        let appt = AppointmentRequest {
            provider_name: None,
            date: day(2026, 10, 19),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            reason: "Sore throat".into(),
            defaulted: vec!["date".into(), "time".into()],
        };
        let text = booking_confirmation(&appt);
        assert!(text.starts_with(
            "Booking the first available provider on Monday, October 19 at 2:00 PM for sore throat."
        ));
        assert!(text.contains("didn't say a date or time"));
    }

    #[test]
    fn test_medication_confirmation() {
        let med = MedicationRequest {
            name: "metformin".into(),
            strength: "500mg".into(),
            dosage: "1 tablet".into(),
            frequency: "once daily".into(),
            defaulted: vec!["dosage".into()],
        };
        assert_eq!(
            medication_confirmation(&med),
            "Adding metformin 500mg, 1 tablet once daily."
        );

        let unnamed = MedicationRequest {
            defaulted: vec!["name".into()],
            ..med
        };
        assert!(medication_confirmation(&unnamed).ends_with('?'));
    }

    #[tokio::test]
    async fn test_check_pages_depend_on_role() {
        let d = dispatcher();
        let routes = RouteTable::default();
        let cmd = ParsedCommand::query(CommandKind::CheckMedications, "what meds am I on");

        let patient = d
            .dispatch(
                DispatchInput::Command(cmd.clone()),
                &request("what meds am I on", None, Some(Role::Patient)),
                &routes,
            )
            .await;
        assert_eq!(patient.outcome.route(), Some("/patient/medications"));

        let admin = d
            .dispatch(
                DispatchInput::Command(cmd),
                &request("what meds am I on", None, Some(Role::Admin)),
                &routes,
            )
            .await;
        assert!(admin.outcome.route().is_none());
        assert!(admin.success);
    }

    #[tokio::test]
    async fn test_general_query_falls_back() {
        let cmd = ParsedCommand::query(CommandKind::GeneralQuery, "what is my copay");
        let result = dispatcher()
            .dispatch(
                DispatchInput::Command(cmd),
                &request("what is my copay", Some("billing"), Some(Role::Patient)),
                &RouteTable::default(),
            )
            .await;
        assert!(!result.success);
        assert_eq!(result.intent_label.as_deref(), Some("general_query"));
    }

    #[test]
    fn test_speak_date_and_time() {
        assert_eq!(speak_date(day(2026, 11, 3)), "Tuesday, November 3");
        assert_eq!(speak_time(NaiveTime::from_hms_opt(9, 5, 0).unwrap()), "9:05 AM");
        assert_eq!(speak_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), "12:00 AM");
    }
}

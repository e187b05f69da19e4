//! Catch-all reply for anything no handler claimed.
//!
//! Always produces something to say: it echoes the current screen back with
//! a few things the user could ask about there.

use voxcare_intent::Domain;

pub struct FallbackHandler;

impl FallbackHandler {
    fn hints(context: &str) -> &'static str {
        match Domain::from_context(context) {
            Some(Domain::Billing) => {
                "overdue accounts, revenue summaries, or sending payment reminders"
            }
            Some(Domain::Audit) => "compliance summaries, security alerts, or exporting logs",
            Some(Domain::Users) => "adding staff, resetting passwords, or reviewing roles",
            Some(Domain::Launchboard) => "backups, employer summaries, branding, or system status",
            _ => "opening a page, booking an appointment, or adding a medication",
        }
    }

    /// A non-empty reply for the given screen context.
    pub fn respond(context: Option<&str>) -> String {
        match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!(
                "You can ask about {}: for example {}.",
                context,
                Self::hints(context)
            ),
            None => format!(
                "I didn't catch that. Try {}.",
                Self::hints("")
            ),
        }
    }
}

use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::IntentTag;

use super::{navigate_or_speak, route_for, DomainHandler, HandlerRequest, Outcome};
use crate::error::HandlerError;

/// Practice-owner intents: backups, employers, branding, system status.
pub struct LaunchboardHandler {
    routes: RouteTable,
}

impl LaunchboardHandler {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }
}

#[async_trait]
impl DomainHandler for LaunchboardHandler {
    fn domain(&self) -> &'static str {
        "launchboard"
    }

    fn describe(&self) -> &'static str {
        "Backups, employer summaries, branding, and system status for practice owners"
    }

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError> {
        let role = request.role.unwrap_or(Role::Owner);

        let outcome = match tag.action() {
            Some("backup") => {
                let route = route_for(&self.routes, role, "backups");
                if request.mentions(&["download", "latest"]) {
                    navigate_or_speak(route, "Downloading the latest backup.")
                } else if request.mentions(&["restore"]) {
                    Outcome::speak("Restoring a backup has to be confirmed on the backups page.")
                } else {
                    navigate_or_speak(
                        route,
                        "Starting a backup now. I'll let you know when it finishes.",
                    )
                }
            }
            Some("employerSummary") => navigate_or_speak(
                route_for(&self.routes, role, "employers"),
                "Here's the employer summary: enrolled members, active plans, and renewals due.",
            ),
            Some("branding") => navigate_or_speak(
                route_for(&self.routes, role, "branding"),
                "Opening branding. You can change the logo, theme, and colors here.",
            ),
            Some("systemStatus") => Outcome::speak(
                "All systems are operational. The last backup completed successfully.",
            ),
            _ => {
                return Err(HandlerError::InvalidRequest(format!(
                    "Unsupported launchboard intent: {}",
                    tag
                )))
            }
        };
        Ok(outcome)
    }
}

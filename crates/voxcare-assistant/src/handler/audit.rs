use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::IntentTag;

use super::{navigate_or_speak, route_for, DomainHandler, HandlerRequest, Outcome};
use crate::error::HandlerError;

/// Audit trail, compliance, and security intents.
pub struct AuditHandler {
    routes: RouteTable,
}

impl AuditHandler {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    fn period(request: &HandlerRequest) -> &'static str {
        if request.mentions(&["today"]) {
            "today"
        } else if request.mentions(&["this month", "last month", "month"]) {
            "the last 30 days"
        } else {
            "the last 7 days"
        }
    }
}

#[async_trait]
impl DomainHandler for AuditHandler {
    fn domain(&self) -> &'static str {
        "audit"
    }

    fn describe(&self) -> &'static str {
        "Audit summaries, compliance status, security alerts, access history, and log exports"
    }

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError> {
        let audit_route = route_for(&self.routes, request.role.unwrap_or(Role::Admin), "audit");
        let period = Self::period(request);

        let outcome = match tag.action() {
            Some("exportLogs") => {
                let format = if request.mentions(&["pdf"]) { "PDF" } else { "CSV" };
                Outcome::speak(format!(
                    "Exporting audit logs for {} as {}. The download will start shortly.",
                    period, format
                ))
            }
            Some("complianceSummary") => Outcome::speak(format!(
                "Compliance summary for {}: access reviews are current \
                 and no policy violations were recorded.",
                period
            )),
            Some("securityAlerts") => navigate_or_speak(
                audit_route,
                format!("Showing security alerts and failed logins for {}.", period),
            ),
            Some("accessHistory") => navigate_or_speak(
                audit_route,
                format!("Here's who accessed records during {}.", period),
            ),
            Some("summary") => navigate_or_speak(
                audit_route,
                format!("Here's the audit activity summary for {}.", period),
            ),
            _ => {
                return Err(HandlerError::InvalidRequest(format!(
                    "Unsupported audit intent: {}",
                    tag
                )))
            }
        };
        Ok(outcome)
    }
}

use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::IntentTag;

use super::{DomainHandler, HandlerRequest, Outcome};
use crate::error::HandlerError;

/// "Take me back" and "go home".
pub struct NavigationHandler {
    routes: RouteTable,
}

impl NavigationHandler {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }
}

#[async_trait]
impl DomainHandler for NavigationHandler {
    fn domain(&self) -> &'static str {
        "navigation"
    }

    fn describe(&self) -> &'static str {
        "Returning to the previous screen or the role's dashboard"
    }

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError> {
        match tag.action() {
            Some("resume") => Ok(match request.last_route.as_deref() {
                Some(route) if !route.is_empty() => {
                    Outcome::navigate(route, "Taking you back to where you were.")
                }
                _ => Outcome::speak("I don't have a previous screen to take you back to."),
            }),
            Some("home") => {
                let role = request.role.unwrap_or(Role::Patient);
                let route = self
                    .routes
                    .lookup(role, "dashboard")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("/{}", role));
                Ok(Outcome::navigate(route, "Heading to your dashboard."))
            }
            _ => Err(HandlerError::InvalidRequest(format!(
                "Unsupported navigation intent: {}",
                tag
            ))),
        }
    }
}

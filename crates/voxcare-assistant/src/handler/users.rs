use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::IntentTag;

use super::{navigate_or_speak, route_for, DomainHandler, HandlerRequest, Outcome};
use crate::error::HandlerError;

/// Staff account management intents.
pub struct UsersHandler {
    routes: RouteTable,
}

impl UsersHandler {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// The word after "for", e.g. "reset the password for jane".
    fn target_user(text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let (_, rest) = lower.split_once(" for ")?;
        let name = rest
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphanumeric());
        if name.is_empty() || matches!(name, "the" | "a" | "my" | "all") {
            return None;
        }
        Some(name.to_string())
    }
}

#[async_trait]
impl DomainHandler for UsersHandler {
    fn domain(&self) -> &'static str {
        "users"
    }

    fn describe(&self) -> &'static str {
        "Listing, creating, and deactivating staff accounts, roles, and password resets"
    }

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError> {
        let users_route = route_for(&self.routes, request.role.unwrap_or(Role::Admin), "users");

        let outcome = match tag.action() {
            Some("resetPassword") => match Self::target_user(&request.text) {
                Some(user) => Outcome::speak(format!("Sending a password reset link to {}.", user)),
                None => Outcome::speak("Whose password should I reset?"),
            },
            Some("create") => {
                let kind = if request.mentions(&["provider"]) {
                    "provider"
                } else {
                    "staff"
                };
                navigate_or_speak(users_route, format!("Opening the new {} account form.", kind))
            }
            Some("deactivate") => Outcome::speak(
                "Deactivating an account needs confirmation. \
                 Open the user's profile and choose deactivate.",
            ),
            Some("roles") => navigate_or_speak(
                users_route,
                "Here are the roles and what each one can access.",
            ),
            Some("list") => {
                let text = if request.mentions(&["how many"]) {
                    "Here's the user count by role."
                } else {
                    "Here's the user list."
                };
                navigate_or_speak(users_route, text)
            }
            _ => {
                return Err(HandlerError::InvalidRequest(format!(
                    "Unsupported users intent: {}",
                    tag
                )))
            }
        };
        Ok(outcome)
    }
}

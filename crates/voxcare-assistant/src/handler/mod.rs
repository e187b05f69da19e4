//! Domain handler registry and trait definition.
//!
//! The classifier only decides the coarse `domain.action` tag; each handler
//! does its own finer keyword matching over the raw text so it can be tested
//! on its own.

pub mod audit;
pub mod billing;
pub mod fallback;
pub mod launchboard;
pub mod navigation;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::{IntentTag, ParsedCommand};

use crate::error::HandlerError;

pub use audit::AuditHandler;
pub use billing::BillingHandler;
pub use fallback::FallbackHandler;
pub use launchboard::LaunchboardHandler;
pub use navigation::NavigationHandler;
pub use users::UsersHandler;

/// What a turn produced for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Say something and stay on the current screen.
    Speak { text: String },
    /// Move the UI to `route` and announce it.
    Navigate { route: String, text: String },
    /// Hand a structured command to the UI layer and confirm it aloud.
    Command { command: ParsedCommand, text: String },
}

impl Outcome {
    pub fn speak(text: impl Into<String>) -> Self {
        Outcome::Speak { text: text.into() }
    }

    pub fn navigate(route: impl Into<String>, text: impl Into<String>) -> Self {
        Outcome::Navigate {
            route: route.into(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Outcome::Speak { text }
            | Outcome::Navigate { text, .. }
            | Outcome::Command { text, .. } => text,
        }
    }

    pub fn route(&self) -> Option<&str> {
        match self {
            Outcome::Navigate { route, .. } => Some(route),
            _ => None,
        }
    }
}

/// Everything a handler may look at besides the intent tag.
#[derive(Debug, Clone, Default)]
pub struct HandlerRequest {
    pub text: String,
    pub context: Option<String>,
    pub role: Option<Role>,
    /// Newest route in session memory, for "take me back".
    pub last_route: Option<String>,
}

impl HandlerRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string);
        self
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn with_last_route(mut self, route: Option<&str>) -> Self {
        self.last_route = route.map(str::to_string);
        self
    }

    /// Case-insensitive substring test over the raw text.
    pub fn mentions(&self, phrases: &[&str]) -> bool {
        let lower = self.text.to_lowercase();
        phrases.iter().any(|p| lower.contains(p))
    }
}

/// Route for `keyword`, preferring `role`'s table, else any role.
pub(crate) fn route_for(routes: &RouteTable, role: Role, keyword: &str) -> Option<String> {
    routes
        .lookup_any(role, keyword)
        .map(|(_, path)| path.to_string())
}

/// Speak `text`, navigating to `route` too when the portal has one.
pub(crate) fn navigate_or_speak(route: Option<String>, text: impl Into<String>) -> Outcome {
    match route {
        Some(route) => Outcome::navigate(route, text),
        None => Outcome::speak(text),
    }
}

/// Trait for domain-specific intent handlers.
#[async_trait]
pub trait DomainHandler: Send + Sync {
    /// Tag prefix this handler serves, e.g. `"billing"`.
    fn domain(&self) -> &'static str;

    /// Short human-readable summary of what the handler covers.
    fn describe(&self) -> &'static str;

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError>;
}

/// Handlers keyed by the domain prefix of the intent tag.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn DomainHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the billing, audit, users, launchboard, and navigation handlers.
    pub fn with_portal_defaults(routes: &RouteTable) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BillingHandler::new(routes.clone())));
        registry.register(Arc::new(AuditHandler::new(routes.clone())));
        registry.register(Arc::new(UsersHandler::new(routes.clone())));
        registry.register(Arc::new(LaunchboardHandler::new(routes.clone())));
        registry.register(Arc::new(NavigationHandler::new(routes.clone())));
        registry
    }

    /// Register a handler under its domain, returning any handler it replaced.
    pub fn register(&mut self, handler: Arc<dyn DomainHandler>) -> Option<Arc<dyn DomainHandler>> {
        self.handlers.insert(handler.domain(), handler)
    }

    pub fn get(&self, domain: &str) -> Option<Arc<dyn DomainHandler>> {
        self.handlers.get(domain).cloned()
    }

    /// Registered domains, sorted.
    pub fn domains(&self) -> Vec<&'static str> {
        let mut domains: Vec<_> = self.handlers.keys().copied().collect();
        domains.sort_unstable();
        domains
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

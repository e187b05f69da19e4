//! Keyword-rule intent classification for the staff/owner portal domains.
//!
//! Rules are kept in one ordered table. With a recognised screen context the
//! rules of that domain run first (including the context-only ones that need
//! the domain to be established, e.g. a bare "invoices" under billing); then
//! every context-free rule is swept in table order. First match wins.

use regex::Regex;
use tracing::debug;

use crate::entities::contains_any;
use crate::types::IntentTag;

/// Portal domains that have handler-backed intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Billing,
    Audit,
    Users,
    Launchboard,
    Navigation,
}

impl Domain {
    pub fn prefix(self) -> &'static str {
        match self {
            Domain::Billing => "billing",
            Domain::Audit => "audit",
            Domain::Users => "users",
            Domain::Launchboard => "launchboard",
            Domain::Navigation => "navigation",
        }
    }

    /// Map a free-form screen context ("billing", "Audit Logs", "owner") to a domain.
    pub fn from_context(context: &str) -> Option<Self> {
        let lower = context.to_lowercase();
        let has = |words: &[&str]| contains_any(&lower, words);
        if has(&["billing", "invoice", "invoices", "payment", "payments"]) {
            Some(Domain::Billing)
        } else if has(&["audit", "audits", "compliance", "log", "logs"]) {
            Some(Domain::Audit)
        } else if has(&["user", "users", "staff", "account", "accounts"]) {
            Some(Domain::Users)
        } else if has(&["launchboard", "owner", "employer", "employers", "branding"]) {
            Some(Domain::Launchboard)
        } else {
            None
        }
    }
}

/// One classification rule. Every regex in `required` must match.
pub struct IntentRule {
    pub domain: Domain,
    pub action: &'static str,
    /// Only considered when the context resolves to `domain`.
    pub requires_context: bool,
    required: Vec<Regex>,
}

impl IntentRule {
    pub fn tag(&self) -> String {
        format!("{}.{}", self.domain.prefix(), self.action)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.required.iter().all(|r| r.is_match(text))
    }
}

/// Compile a whole-word alternation.
fn any_of(words: &[&str]) -> Regex {
    let alts: Vec<String> = words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alts.join("|"))).expect("Invalid intent keyword regex")
}

pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        let mut rules = Vec::new();
        let mut rule = |domain, action, requires_context, groups: &[&[&str]]| {
            rules.push(IntentRule {
                domain,
                action,
                requires_context,
                required: groups.iter().map(|g| any_of(g)).collect(),
            });
        };

        // =====================================================================
        // Billing
        // =====================================================================
        rule(
            Domain::Billing,
            "overdueCheck",
            false,
            &[&["overdue", "past due", "outstanding", "unpaid"]],
        );
        rule(
            Domain::Billing,
            "sendReminders",
            false,
            &[&["payment reminder", "payment reminders"]],
        );
        rule(Domain::Billing, "sendReminders", false, &[&["send"], &["reminder", "reminders"]]);
        rule(Domain::Billing, "sendReminders", true, &[&["remind", "reminder", "reminders"]]);
        rule(
            Domain::Billing,
            "compareRevenue",
            true,
            &[&["compare", "comparison", "versus", "vs", "last month", "previous month"]],
        );
        rule(Domain::Billing, "invoiceLookup", true, &[&["invoice", "invoices"]]);
        rule(
            Domain::Billing,
            "summary",
            false,
            &[&["revenue", "billing summary", "collected", "collections"]],
        );
        rule(
            Domain::Billing,
            "summary",
            true,
            &[&["summary", "total", "how much", "balance", "billing"]],
        );

        // =====================================================================
        // Audit
        // =====================================================================
        rule(
            Domain::Audit,
            "exportLogs",
            false,
            &[&["export", "download"], &["log", "logs", "audit", "audit trail"]],
        );
        // Must precede the generic report rule so "compliance report" is not a plain summary.
        rule(Domain::Audit, "complianceSummary", false, &[&["compliance", "compliant", "hipaa"]]);
        rule(
            Domain::Audit,
            "securityAlerts",
            false,
            &[&["failed login", "failed logins", "suspicious", "security", "breach"]],
        );
        rule(
            Domain::Audit,
            "accessHistory",
            false,
            &[&["who accessed", "access history", "access log", "access logs"]],
        );
        rule(
            Domain::Audit,
            "summary",
            false,
            &[&["audit report", "audit summary", "audit trail", "audit log", "audit logs"]],
        );
        rule(Domain::Audit, "summary", true, &[&["report", "summary", "activity", "log", "logs"]]);

        // =====================================================================
        // Users
        // =====================================================================
        rule(Domain::Users, "resetPassword", false, &[&["reset"], &["password", "passwords"]]);
        rule(
            Domain::Users,
            "create",
            false,
            &[
                &["add", "create", "invite", "new"],
                &["user", "users", "staff", "staff member", "provider account"],
            ],
        );
        rule(
            Domain::Users,
            "deactivate",
            false,
            &[&["deactivate", "disable", "suspend", "remove user", "delete user"]],
        );
        rule(Domain::Users, "roles", true, &[&["role", "roles", "permission", "permissions"]]);
        rule(Domain::Users, "list", false, &[&["list", "show", "how many"], &["users", "staff"]]);
        rule(Domain::Users, "list", true, &[&["list", "show", "how many", "who"]]);

        // =====================================================================
        // Launchboard
        // =====================================================================
        rule(Domain::Launchboard, "backup", false, &[&["backup", "backups", "back up"]]);
        rule(Domain::Launchboard, "employerSummary", false, &[&["employer", "employers"]]);
        rule(
            Domain::Launchboard,
            "branding",
            false,
            &[&["branding", "logo", "theme", "colors", "colours"]],
        );
        rule(
            Domain::Launchboard,
            "systemStatus",
            false,
            &[&["system status", "uptime", "system health", "health check"]],
        );
        rule(Domain::Launchboard, "systemStatus", true, &[&["status", "health"]]);

        // =====================================================================
        // Navigation
        // =====================================================================
        rule(
            Domain::Navigation,
            "resume",
            false,
            &[&["where was i", "take me back", "go back", "previous screen"]],
        );
        rule(
            Domain::Navigation,
            "home",
            false,
            &[&["go home", "home page", "homepage", "main dashboard"]],
        );

        Self { rules }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify an utterance given the current screen context.
    pub fn classify(&self, text: &str, context: Option<&str>) -> IntentTag {
        self.classify_with_trace(text, context).0
    }

    /// Like [`classify`](Self::classify), also returning the index of the rule that fired.
    pub fn classify_with_trace(
        &self,
        text: &str,
        context: Option<&str>,
    ) -> (IntentTag, Option<usize>) {
        if text.trim().is_empty() {
            return (IntentTag::unclassified(), None);
        }

        let scoped = context.and_then(Domain::from_context);

        let in_context = scoped.and_then(|domain| {
            self.rules
                .iter()
                .position(|r| r.domain == domain && r.matches(text))
        });
        let hit = in_context.or_else(|| {
            self.rules
                .iter()
                .position(|r| !r.requires_context && r.matches(text))
        });

        match hit {
            Some(index) => {
                let tag = IntentTag::new(self.rules[index].tag());
                debug!(tag = %tag, rule = index, context = ?context, "Intent classified");
                (tag, Some(index))
            }
            None => (IntentTag::unclassified(), None),
        }
    }
}

//! Billing intents: overdue accounts, reminders, revenue, invoices.

use async_trait::async_trait;
use voxcare_core::{Role, RouteTable};
use voxcare_intent::IntentTag;

use super::{navigate_or_speak, route_for, DomainHandler, HandlerRequest, Outcome};
use crate::error::HandlerError;

pub struct BillingHandler {
    routes: RouteTable,
}

impl BillingHandler {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    fn role(request: &HandlerRequest) -> Role {
        request.role.unwrap_or(Role::Admin)
    }

    fn overdue(&self, request: &HandlerRequest) -> Outcome {
        navigate_or_speak(
            route_for(&self.routes, Self::role(request), "invoices"),
            "Here are the overdue accounts. I've filtered invoices to anything past due.",
        )
    }

    fn compare(&self) -> Outcome {
        Outcome::speak("Comparing this month's revenue with last month.")
    }

    fn invoice_number(text: &str) -> Option<&str> {
        text.split(|c: char| !c.is_ascii_digit())
            .find(|s| !s.is_empty())
    }
}

#[async_trait]
impl DomainHandler for BillingHandler {
    fn domain(&self) -> &'static str {
        "billing"
    }

    fn describe(&self) -> &'static str {
        "Overdue accounts, payment reminders, revenue comparisons, and invoices"
    }

    async fn handle(
        &self,
        tag: &IntentTag,
        request: &HandlerRequest,
    ) -> Result<Outcome, HandlerError> {
        let role = Self::role(request);
        let outcome = match tag.action() {
            Some("overdueCheck") => self.overdue(request),
            Some("sendReminders") => {
                if request.mentions(&["preview", "draft"]) {
                    Outcome::speak(
                        "Here's a preview of the payment reminder. Say send to deliver it.",
                    )
                } else {
                    Outcome::speak(
                        "Payment reminders are on their way to every account \
                         with an overdue balance.",
                    )
                }
            }
            Some("compareRevenue") => self.compare(),
            Some("invoiceLookup") => {
                let route = route_for(&self.routes, role, "invoices");
                match Self::invoice_number(&request.text) {
                    Some(number) => navigate_or_speak(
                        route.map(|r| format!("{}?invoice={}", r, number)),
                        format!("Opening invoice {}.", number),
                    ),
                    None => navigate_or_speak(route, "Opening invoices."),
                }
            }
            Some("summary") => {
                if request.mentions(&["overdue", "past due", "unpaid"]) {
                    self.overdue(request)
                } else if request.mentions(&["compare", "last month", "versus"]) {
                    self.compare()
                } else {
                    navigate_or_speak(
                        route_for(&self.routes, role, "billing"),
                        "Here's your billing summary: revenue collected, \
                         open balances, and recent payments.",
                    )
                }
            }
            _ => {
                return Err(HandlerError::InvalidRequest(format!(
                    "Unsupported billing intent: {}",
                    tag
                )))
            }
        };
        tracing::info!(tag = %tag, "Billing intent handled");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> BillingHandler {
        BillingHandler::new(RouteTable::default())
    }

    async fn run(tag: &str, text: &str) -> Result<Outcome, HandlerError> {
        let request = HandlerRequest::new(text)
            .with_role(Some(Role::Admin))
            .with_context(Some("billing"));
        handler().handle(&IntentTag::new(tag), &request).await
    }

    #[tokio::test]
    async fn test_overdue_check_navigates_to_invoices() {
        let outcome = run("billing.overdueCheck", "what's our overdue accounts").await.unwrap();
        assert_eq!(outcome.route(), Some("/admin/invoices"));
        assert!(!outcome.text().is_empty());
    }

    #[tokio::test]
    async fn test_summary_branches_on_keywords() {
        let overdue = run("billing.summary", "summary of unpaid balances").await.unwrap();
        assert_eq!(overdue.route(), Some("/admin/invoices"));

        let compare = run("billing.summary", "total compared to last month").await.unwrap();
        assert!(compare.text().contains("last month"));

        let plain = run("billing.summary", "billing summary").await.unwrap();
        assert_eq!(plain.route(), Some("/admin/billing"));
    }

    #[tokio::test]
    async fn test_invoice_lookup_with_number() {
        let outcome = run("billing.invoiceLookup", "pull up invoice 1042").await.unwrap();
        assert_eq!(outcome.route(), Some("/admin/invoices?invoice=1042"));
        assert_eq!(outcome.text(), "Opening invoice 1042.");
    }

    #[tokio::test]
    async fn test_reminders() {
        let sent = run("billing.sendReminders", "send payment reminders").await.unwrap();
        assert!(sent.text().contains("Payment reminders"));
        let preview = run("billing.sendReminders", "draft a reminder").await.unwrap();
        assert!(preview.text().contains("preview"));
    }

    #[tokio::test]
    async fn test_without_route_table_speaks() {
        let handler = BillingHandler::new(RouteTable::empty());
        let outcome = handler
            .handle(&IntentTag::new("billing.overdueCheck"), &HandlerRequest::new("overdue"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Speak { .. }));
    }

    #[tokio::test]
    async fn test_unknown_action_is_error() {
        let err = run("billing.refundEverything", "refund").await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidRequest(_)));
    }
}

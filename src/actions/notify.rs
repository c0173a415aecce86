//! Notification action: resolve recipients, substitute template variables,
//! and dispatch through the configured channel.
//!
//! Per-recipient delivery failures are captured independently and
//! aggregated into sent/failed counts; only an empty resolved-recipient
//! list fails the action as a whole.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::review::{Location, Review};
use crate::domain::models::workflow::{ActionConfig, ActionKind, NotifyChannel, Recipient};

pub struct NotifyAction;

#[async_trait]
impl Action for NotifyAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Notify
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "Send notification",
            description: "Notify recipients over email, Slack, or webhook with template substitution",
            config_summary: "recipients (emails, user ids, or roles), channel, subject, body",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::Notify { recipients, body, .. } => {
                let mut problems = Vec::new();
                if recipients.is_empty() {
                    problems.push("at least one recipient is required".to_string());
                }
                if body.trim().is_empty() {
                    problems.push("notification body cannot be empty".to_string());
                }
                problems
            }
            _ => vec!["configuration variant does not match notify".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::Notify { recipients, channel, subject, body } = config else {
            return Err(wrong_config(self.kind()));
        };

        let review = match ctx.review_id() {
            Some(id) => ctx.services.reviews.get(id).await?,
            None => None,
        };
        let location = match ctx.location_id() {
            Some(id) => ctx.services.locations.get(id).await?,
            None => None,
        };

        let subject = substitute(subject, &ctx.workflow.name, review.as_ref(), location.as_ref());
        let body = substitute(body, &ctx.workflow.name, review.as_ref(), location.as_ref());

        let emails = self.resolve_recipients(recipients, ctx).await?;
        if emails.is_empty() {
            return Err(DomainError::NotificationFailed(
                "no recipients resolved".to_string(),
            ));
        }

        let mut sent = 0usize;
        let mut failed = 0usize;
        let mut failures: Vec<String> = Vec::new();

        match channel {
            NotifyChannel::Email => {
                for email in &emails {
                    match ctx.services.notifier.send_email(email, &subject, &body).await {
                        Ok(()) => sent += 1,
                        Err(err) => {
                            failed += 1;
                            warn!(recipient = %email, error = %err, "Email delivery failed");
                            failures.push(format!("{email}: {err}"));
                        }
                    }
                }
            }
            NotifyChannel::Slack { channel: slack_channel } => {
                let message = format!("*{subject}*\n{body}");
                match ctx.services.notifier.send_slack(slack_channel, &message).await {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        failed += 1;
                        warn!(channel = %slack_channel, error = %err, "Slack delivery failed");
                        failures.push(err.to_string());
                    }
                }
            }
            NotifyChannel::Webhook { url } => {
                let payload = json!({
                    "subject": subject,
                    "body": body,
                    "workflow_id": ctx.workflow.id,
                    "execution_id": ctx.execution_id,
                    "recipients": emails,
                });
                match ctx.services.notifier.send_webhook(url, &payload).await {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        failed += 1;
                        warn!(url = %url, error = %err, "Webhook delivery failed");
                        failures.push(err.to_string());
                    }
                }
            }
        }

        if sent == 0 {
            return Err(DomainError::NotificationFailed(format!(
                "all deliveries failed: {}",
                failures.join("; ")
            )));
        }

        Ok(json!({
            "sent": sent,
            "failed": failed,
            "failures": failures,
        }))
    }
}

impl NotifyAction {
    /// Expand symbolic recipients into concrete email addresses,
    /// deduplicated in resolution order.
    async fn resolve_recipients(
        &self,
        recipients: &[Recipient],
        ctx: &ActionContext,
    ) -> DomainResult<Vec<String>> {
        let mut emails: Vec<String> = Vec::new();
        let mut push = |email: String, emails: &mut Vec<String>| {
            if !email.is_empty() && !emails.contains(&email) {
                emails.push(email);
            }
        };

        for recipient in recipients {
            match recipient {
                Recipient::Email { address } => push(address.clone(), &mut emails),
                Recipient::User { user_id } => {
                    if let Some(user) = ctx.services.users.get(*user_id).await? {
                        push(user.email, &mut emails);
                    }
                }
                Recipient::WorkflowCreator => {
                    if let Some(user) = ctx.services.users.get(ctx.workflow.created_by).await? {
                        push(user.email, &mut emails);
                    }
                }
                Recipient::TenantAdmins => {
                    for admin in ctx
                        .services
                        .users
                        .admins_of_tenant(ctx.workflow.tenant_id)
                        .await?
                    {
                        push(admin.email, &mut emails);
                    }
                }
            }
        }
        Ok(emails)
    }
}

/// Template-variable substitution into subject/body text.
fn substitute(
    template: &str,
    workflow_name: &str,
    review: Option<&Review>,
    location: Option<&Location>,
) -> String {
    let mut out = template.to_string();
    out = out.replace("{{workflow.name}}", workflow_name);
    out = out.replace("{{date}}", &Utc::now().format("%Y-%m-%d").to_string());
    if let Some(review) = review {
        out = out.replace("{{review.content}}", &review.content);
        out = out.replace("{{review.rating}}", &review.rating.to_string());
        out = out.replace("{{review.author_name}}", &review.author_name);
        out = out.replace("{{review.platform}}", &review.platform);
    }
    if let Some(location) = location {
        out = out.replace("{{location.name}}", &location.name);
        out = out.replace("{{location.city}}", &location.city);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn review() -> Review {
        Review {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            rating: 2,
            content: "Slow service".to_string(),
            author_name: "Pat".to_string(),
            platform: "google".to_string(),
            metadata: serde_json::Map::new(),
            sentiment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_substitute_review_and_location() {
        let location = Location {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Downtown".to_string(),
            address: String::new(),
            city: "Austin".to_string(),
            phone: String::new(),
            website: String::new(),
            business_hours: String::new(),
        };
        let out = substitute(
            "New {{review.rating}}-star review at {{location.name}}: {{review.content}}",
            "wf",
            Some(&review()),
            Some(&location),
        );
        assert_eq!(out, "New 2-star review at Downtown: Slow service");
    }

    #[test]
    fn test_substitute_leaves_unknown_vars() {
        let out = substitute("Hello {{unknown.var}}", "wf", None, None);
        assert_eq!(out, "Hello {{unknown.var}}");
    }

    #[test]
    fn test_substitute_without_entities_keeps_placeholders() {
        let out = substitute("{{review.content}}", "wf", None, None);
        assert_eq!(out, "{{review.content}}");
    }
}

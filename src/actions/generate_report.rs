//! Generate-report action: delegate to the external report generator.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::DomainResult;
use crate::domain::models::workflow::{ActionConfig, ActionKind, Recipient};
use crate::domain::ports::report_generator::ReportSpec;

pub struct GenerateReportAction;

#[async_trait]
impl Action for GenerateReportAction {
    fn kind(&self) -> ActionKind {
        ActionKind::GenerateReport
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "Generate report",
            description: "Create a review report for a date range and location scope",
            config_summary: "period_days, optional location_ids, optional recipients",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::GenerateReport { period_days, .. } if *period_days == 0 => {
                vec!["period_days must be at least 1".to_string()]
            }
            ActionConfig::GenerateReport { .. } => vec![],
            _ => vec!["configuration variant does not match generate_report".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::GenerateReport { period_days, location_ids, recipients } = config else {
            return Err(wrong_config(self.kind()));
        };

        let now = Utc::now();
        let mut recipient_emails = Vec::new();
        for recipient in recipients {
            match recipient {
                Recipient::Email { address } => recipient_emails.push(address.clone()),
                Recipient::User { user_id } => {
                    if let Some(user) = ctx.services.users.get(*user_id).await? {
                        recipient_emails.push(user.email);
                    }
                }
                Recipient::WorkflowCreator => {
                    if let Some(user) = ctx.services.users.get(ctx.workflow.created_by).await? {
                        recipient_emails.push(user.email);
                    }
                }
                Recipient::TenantAdmins => {
                    for admin in ctx
                        .services
                        .users
                        .admins_of_tenant(ctx.workflow.tenant_id)
                        .await?
                    {
                        recipient_emails.push(admin.email);
                    }
                }
            }
        }

        // Scope to the event's location when none are configured.
        let mut location_ids = location_ids.clone();
        if location_ids.is_empty() {
            if let Some(id) = ctx.location_id() {
                location_ids.push(id);
            }
        }

        let spec = ReportSpec {
            from: now - Duration::days(i64::from(*period_days)),
            to: now,
            location_ids,
            recipient_emails,
        };

        let handle = ctx
            .services
            .reports
            .generate(ctx.workflow.tenant_id, ctx.workflow.created_by, spec)
            .await?;

        Ok(json!({
            "report_id": handle.id,
            "status": handle.status,
        }))
    }
}

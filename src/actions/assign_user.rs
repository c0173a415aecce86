//! Assign-user action: set the owner of a review's draft response.

use async_trait::async_trait;
use serde_json::json;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::workflow::{ActionConfig, ActionKind};

pub struct AssignUserAction;

#[async_trait]
impl Action for AssignUserAction {
    fn kind(&self) -> ActionKind {
        ActionKind::AssignUser
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "Assign user",
            description: "Find or create the review's draft response and set its owning user",
            config_summary: "user_id: id of an existing user",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::AssignUser { .. } => vec![],
            _ => vec!["configuration variant does not match assign_user".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::AssignUser { user_id } = config else {
            return Err(wrong_config(self.kind()));
        };

        let review_id = ctx.review_id().ok_or_else(|| DomainError::ValidationFailed(
            "assign_user requires a review in the event context".to_string(),
        ))?;

        // Both entities must exist before any mutation.
        ctx.services
            .reviews
            .get(review_id)
            .await?
            .ok_or(DomainError::ReviewNotFound(review_id))?;
        let user = ctx
            .services
            .users
            .get(*user_id)
            .await?
            .ok_or(DomainError::UserNotFound(*user_id))?;

        // Find-or-create keeps concurrent workflows converging on one row.
        let mut response = ctx.services.responses.find_or_create(review_id).await?;
        response.assigned_user = Some(user.id);
        ctx.services.responses.update(&response).await?;

        Ok(json!({
            "review_id": review_id,
            "response_id": response.id,
            "assigned_user": user.id,
        }))
    }
}

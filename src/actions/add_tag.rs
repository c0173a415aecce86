//! Add-tag action: merge configured tags into a review's tag metadata.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::workflow::{ActionConfig, ActionKind};

pub struct AddTagAction;

#[async_trait]
impl Action for AddTagAction {
    fn kind(&self) -> ActionKind {
        ActionKind::AddTag
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "Add tags",
            description: "Merge tags into the review's tag metadata (deduplicated, order-stable)",
            config_summary: "tags: non-empty list of tag strings",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::AddTag { tags } if tags.is_empty() => {
                vec!["at least one tag is required".to_string()]
            }
            ActionConfig::AddTag { .. } => vec![],
            _ => vec!["configuration variant does not match add_tag".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::AddTag { tags } = config else {
            return Err(wrong_config(self.kind()));
        };
        if tags.is_empty() {
            return Err(DomainError::InvalidActionConfig {
                kind: self.kind().as_str().to_string(),
                reason: "no tags configured".to_string(),
            });
        }

        let review_id = ctx.review_id().ok_or_else(|| DomainError::ValidationFailed(
            "add_tag requires a review in the event context".to_string(),
        ))?;
        let mut review = ctx
            .services
            .reviews
            .get(review_id)
            .await?
            .ok_or(DomainError::ReviewNotFound(review_id))?;

        let added = review.merge_tags(tags);
        ctx.services.reviews.update(&review).await?;

        debug!(review_id = %review_id, added = added.len(), "Tags merged into review");

        Ok(json!({
            "review_id": review_id,
            "added_tags": added,
            "total_tags": review.tags().len(),
        }))
    }
}

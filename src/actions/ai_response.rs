//! AI-response action: delegate to the AI decision & response service.
//!
//! This action never propagates an AI failure: storage or pipeline errors
//! inside the responder are converted at this boundary into the
//! draft-with-rejection-reason fallback, so a human always ends up with
//! something to act on.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::workflow::{ActionConfig, ActionKind};
use crate::services::ai_responder::derive_params;

pub struct AiResponseAction;

#[async_trait]
impl Action for AiResponseAction {
    fn kind(&self) -> ActionKind {
        ActionKind::AiResponse
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "AI response",
            description: "Draft an AI response for the review under the workflow's safety policy",
            config_summary: "skip_existing: skip when a response already exists",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::AiResponse { .. } => vec![],
            _ => vec!["configuration variant does not match ai_response".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::AiResponse { skip_existing } = config else {
            return Err(wrong_config(self.kind()));
        };

        if !ctx.workflow.ai.enabled {
            return Err(DomainError::InvalidActionConfig {
                kind: self.kind().as_str().to_string(),
                reason: "workflow does not have AI enabled".to_string(),
            });
        }

        let review_id = ctx.review_id().ok_or_else(|| DomainError::ValidationFailed(
            "ai_response requires a review in the event context".to_string(),
        ))?;
        let review = ctx
            .services
            .reviews
            .get(review_id)
            .await?
            .ok_or(DomainError::ReviewNotFound(review_id))?;

        // Skip logic runs before any mutation.
        if *skip_existing {
            if let Some(existing) = ctx.services.responses.find_by_review(review_id).await? {
                return Ok(json!({
                    "skipped": true,
                    "reason": "response already exists",
                    "response_id": existing.id,
                }));
            }
        }

        let location = ctx
            .services
            .locations
            .get(review.location_id)
            .await
            .unwrap_or(None);
        // The workflow's creator signs off on the draft when resolvable.
        let user = ctx
            .services
            .users
            .get(ctx.workflow.created_by)
            .await
            .unwrap_or(None);

        let outcome = match ctx
            .services
            .responder
            .generate_response(&review, user.as_ref(), location.as_ref(), &ctx.workflow)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                // Boundary conversion: degrade to a manual draft instead of
                // failing the run.
                warn!(review_id = %review_id, error = %err, "AI response pipeline failed");
                let params = derive_params(&review, &ctx.workflow);
                let response = ctx
                    .services
                    .responder
                    .fallback_draft(&review, &params, &format!("AI pipeline error: {err}"))
                    .await?;
                return Ok(json!({
                    "responded": true,
                    "response_id": response.id,
                    "response_status": response.status.as_str(),
                    "ai_generated": false,
                    "rejection_reason": response.rejection_reason,
                    "auto_approved": false,
                    "requires_review": true,
                }));
            }
        };

        match &outcome.response {
            Some(response) => Ok(json!({
                "responded": true,
                "response_id": response.id,
                "response_status": response.status.as_str(),
                "ai_generated": response.ai_generated,
                "rejection_reason": response.rejection_reason,
                "auto_approved": outcome.auto_approved,
                "requires_review": outcome.requires_review,
                "decision": outcome.decision,
            })),
            None => Ok(json!({
                "responded": false,
                "reason": outcome.reason,
                "decision": outcome.decision,
            })),
        }
    }
}

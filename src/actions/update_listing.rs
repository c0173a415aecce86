//! Update-listing action: apply an allow-listed field diff to a location.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::actions::{wrong_config, Action, ActionContext, ActionDescriptor};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::review::Location;
use crate::domain::models::workflow::{ActionConfig, ActionKind};

pub struct UpdateListingAction;

#[async_trait]
impl Action for UpdateListingAction {
    fn kind(&self) -> ActionKind {
        ActionKind::UpdateListing
    }

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: "Update listing",
            description: "Apply writable field changes to a location; unknown fields are skipped",
            config_summary: "fields: map of field name to new string value",
        }
    }

    fn validate(&self, config: &ActionConfig) -> Vec<String> {
        match config {
            ActionConfig::UpdateListing { fields } => {
                let mut problems = Vec::new();
                if fields.is_empty() {
                    problems.push("at least one field is required".to_string());
                }
                // Flag configs that would be a complete no-op.
                if !fields.is_empty()
                    && !fields
                        .keys()
                        .any(|k| Location::WRITABLE_FIELDS.contains(&k.as_str()))
                {
                    problems.push("no configured field is writable".to_string());
                }
                problems
            }
            _ => vec!["configuration variant does not match update_listing".to_string()],
        }
    }

    async fn execute(
        &self,
        config: &ActionConfig,
        ctx: &ActionContext,
    ) -> DomainResult<serde_json::Value> {
        let ActionConfig::UpdateListing { fields } = config else {
            return Err(wrong_config(self.kind()));
        };

        let location_id = ctx.location_id().ok_or_else(|| DomainError::ValidationFailed(
            "update_listing requires a location in the event context".to_string(),
        ))?;
        let mut location = ctx
            .services
            .locations
            .get(location_id)
            .await?
            .ok_or(DomainError::LocationNotFound(location_id))?;

        let updated = location.apply_diff(fields);
        if !updated.is_empty() {
            ctx.services.locations.update(&location).await?;
        }

        debug!(location_id = %location_id, updated = ?updated, "Listing fields updated");

        Ok(json!({
            "location_id": location_id,
            "updated_fields": updated,
            "skipped_fields": fields.len() - updated.len(),
        }))
    }
}

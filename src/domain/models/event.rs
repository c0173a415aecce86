//! Automation events: what enters the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::workflow::TriggerType;

/// What produced an event, recorded on each execution for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerSource {
    Review { review_id: Uuid },
    Sentiment { review_id: Uuid },
    Schedule { schedule_id: Uuid },
    Manual { user_id: Uuid },
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Review { review_id } => write!(f, "review:{review_id}"),
            Self::Sentiment { review_id } => write!(f, "sentiment:{review_id}"),
            Self::Schedule { schedule_id } => write!(f, "schedule:{schedule_id}"),
            Self::Manual { user_id } => write!(f, "manual:{user_id}"),
        }
    }
}

/// A domain event entering the automation service.
///
/// `data` is the raw snapshot trigger thresholds and conditions evaluate
/// against, and the base of the context passed to actions. Entity hints
/// (`review_id`, `location_id`) let the service resolve the owning tenant
/// when `tenant_id` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationEvent {
    pub trigger: TriggerType,
    pub source: TriggerSource,
    pub tenant_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub data: serde_json::Value,
}

impl AutomationEvent {
    /// Event for a review arriving or being re-evaluated.
    pub fn for_review(trigger: TriggerType, review: &crate::domain::models::review::Review) -> Self {
        let data = serde_json::json!({
            "review": {
                "id": review.id,
                "rating": review.rating,
                "content": review.content,
                "author_name": review.author_name,
                "platform": review.platform,
                "sentiment": review.sentiment,
            },
            "rating": review.rating,
            "platform": review.platform,
        });
        Self {
            trigger,
            source: TriggerSource::Review { review_id: review.id },
            tenant_id: None,
            review_id: Some(review.id),
            location_id: Some(review.location_id),
            data,
        }
    }

    /// Manual invocation by an operator, with an arbitrary data snapshot.
    pub fn manual(user_id: Uuid, tenant_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            trigger: TriggerType::Manual,
            source: TriggerSource::Manual { user_id },
            tenant_id: Some(tenant_id),
            review_id: None,
            location_id: None,
            data,
        }
    }

    /// Scheduled tick for a tenant, fired by an external scheduler.
    pub fn scheduled(schedule_id: Uuid, tenant_id: Uuid) -> Self {
        Self {
            trigger: TriggerType::Scheduled,
            source: TriggerSource::Schedule { schedule_id },
            tenant_id: Some(tenant_id),
            review_id: None,
            location_id: None,
            data: serde_json::json!({}),
        }
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_source_display() {
        let id = Uuid::nil();
        assert_eq!(
            TriggerSource::Review { review_id: id }.to_string(),
            format!("review:{id}")
        );
        assert_eq!(
            TriggerSource::Manual { user_id: id }.to_string(),
            format!("manual:{id}")
        );
    }
}

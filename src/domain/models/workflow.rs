//! Workflow domain model.
//!
//! A workflow is a tenant-owned automation rule: a trigger plus a list of
//! conditions plus an ordered list of actions, with an optional AI policy
//! governing the ai_response action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The event category that makes a workflow eligible to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Any review arriving, regardless of rating.
    ReviewReceived,
    /// Review with rating at or below the configured threshold.
    NegativeReview,
    /// Review with rating at or above the configured threshold.
    PositiveReview,
    /// Sentiment score at or below the configured threshold.
    NegativeSentiment,
    /// Fired by an external scheduler tick.
    Scheduled,
    /// Fired explicitly by an operator.
    Manual,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewReceived => "review_received",
            Self::NegativeReview => "negative_review",
            Self::PositiveReview => "positive_review",
            Self::NegativeSentiment => "negative_sentiment",
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "review_received" => Some(Self::ReviewReceived),
            "negative_review" => Some(Self::NegativeReview),
            "positive_review" => Some(Self::PositiveReview),
            "negative_sentiment" => Some(Self::NegativeSentiment),
            "scheduled" => Some(Self::Scheduled),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Whether this trigger is one of the review-event categories. A single
    /// review event is dispatched against all of them; the thresholds in
    /// each workflow's trigger config decide which actually fire.
    pub fn is_review_category(&self) -> bool {
        matches!(
            self,
            Self::ReviewReceived | Self::NegativeReview | Self::PositiveReview | Self::NegativeSentiment
        )
    }
}

/// Trigger-specific thresholds and filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Rating threshold for negative_review (match when rating <= threshold)
    /// and positive_review (match when rating >= threshold).
    pub rating_threshold: Option<i32>,
    /// Sentiment score threshold for negative_sentiment (match when <=).
    pub sentiment_threshold: Option<f64>,
    /// Restrict matching to reviews from these platforms (empty = all).
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl TriggerConfig {
    /// Effective rating threshold for negative-review triggers.
    pub fn negative_rating_threshold(&self) -> i32 {
        self.rating_threshold.unwrap_or(2)
    }

    /// Effective rating threshold for positive-review triggers.
    pub fn positive_rating_threshold(&self) -> i32 {
        self.rating_threshold.unwrap_or(4)
    }

    /// Effective sentiment threshold for negative-sentiment triggers.
    pub fn negative_sentiment_threshold(&self) -> f64 {
        self.sentiment_threshold.unwrap_or(0.3)
    }
}

/// Comparison operator for a workflow condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    Contains,
}

/// A field/operator/value predicate further restricting eligibility.
///
/// `field` is dot-addressable into the event data snapshot, e.g.
/// `review.rating` or `location.city`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
}

/// Identifier for a registered action implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddTag,
    AssignUser,
    Notify,
    GenerateReport,
    UpdateListing,
    AiResponse,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddTag => "add_tag",
            Self::AssignUser => "assign_user",
            Self::Notify => "notify",
            Self::GenerateReport => "generate_report",
            Self::UpdateListing => "update_listing",
            Self::AiResponse => "ai_response",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    /// A literal email address.
    Email { address: String },
    /// A user resolved through the user store.
    User { user_id: Uuid },
    /// The user who created the workflow.
    WorkflowCreator,
    /// All admin users of the owning tenant.
    TenantAdmins,
}

/// Delivery channel for a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifyChannel {
    Email,
    Slack { channel: String },
    Webhook { url: String },
}

/// Typed per-action configuration.
///
/// The tag doubles as the action type identifier, so unsupported action
/// types are rejected when a workflow is deserialized rather than at
/// dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    AddTag {
        tags: Vec<String>,
    },
    AssignUser {
        user_id: Uuid,
    },
    Notify {
        recipients: Vec<Recipient>,
        channel: NotifyChannel,
        subject: String,
        body: String,
    },
    GenerateReport {
        /// Look-back window for the report, in days.
        #[serde(default = "default_report_days")]
        period_days: u32,
        #[serde(default)]
        location_ids: Vec<Uuid>,
        #[serde(default)]
        recipients: Vec<Recipient>,
    },
    UpdateListing {
        /// Field name -> new value. Non-writable fields are skipped.
        fields: serde_json::Map<String, serde_json::Value>,
    },
    AiResponse {
        /// Skip without mutation when a response already exists.
        #[serde(default)]
        skip_existing: bool,
    },
}

fn default_report_days() -> u32 {
    30
}

impl ActionConfig {
    /// The registry key for this configuration.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::AddTag { .. } => ActionKind::AddTag,
            Self::AssignUser { .. } => ActionKind::AssignUser,
            Self::Notify { .. } => ActionKind::Notify,
            Self::GenerateReport { .. } => ActionKind::GenerateReport,
            Self::UpdateListing { .. } => ActionKind::UpdateListing,
            Self::AiResponse { .. } => ActionKind::AiResponse,
        }
    }
}

/// One entry in a workflow's ordered action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(flatten)]
    pub config: ActionConfig,
    /// When true, a failure of this action aborts the remainder of the run.
    #[serde(default)]
    pub critical: bool,
}

impl ActionSpec {
    pub fn new(config: ActionConfig) -> Self {
        Self { config, critical: false }
    }

    pub fn critical(config: ActionConfig) -> Self {
        Self { config, critical: true }
    }

    pub fn kind(&self) -> ActionKind {
        self.config.kind()
    }
}

/// How strictly AI-generated content is gated before publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    Low,
    Standard,
    High,
}

impl Default for SafetyLevel {
    fn default() -> Self {
        Self::Standard
    }
}

/// Thresholds under which a generated response may skip manual approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoApprovePolicy {
    #[serde(default)]
    pub enabled: bool,
    /// Minimum decision confidence.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Maximum review rating eligible for auto-approval.
    #[serde(default = "default_max_rating")]
    pub max_rating: i32,
}

fn default_min_confidence() -> f64 {
    0.8
}

fn default_max_rating() -> i32 {
    3
}

impl Default for AutoApprovePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            min_confidence: default_min_confidence(),
            max_rating: default_max_rating(),
        }
    }
}

/// Workflow-level AI configuration consumed by the ai_response action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiPolicy {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub safety_level: SafetyLevel,
    /// When true, generated responses always require manual approval.
    #[serde(default)]
    pub require_approval: bool,
    /// Overrides the rating-derived tone when set.
    pub default_tone: Option<crate::domain::models::decision::ResponseTone>,
    /// Maximum response length in characters.
    pub max_length: Option<u32>,
    pub brand_voice_id: Option<Uuid>,
    #[serde(default)]
    pub auto_approve: AutoApprovePolicy,
}

/// A tenant-owned automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Higher priority runs first within a matching pass.
    pub priority: i32,
    pub trigger: TriggerType,
    #[serde(default)]
    pub trigger_config: TriggerConfig,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub ai: AiPolicy,
    /// Lifetime execution counter.
    #[serde(default)]
    pub run_count: u64,
    /// Lifetime completed-execution counter.
    #[serde(default)]
    pub success_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(
        tenant_id: Uuid,
        created_by: Uuid,
        name: impl Into<String>,
        trigger: TriggerType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            created_by,
            name: name.into(),
            description: String::new(),
            is_active: true,
            priority: 0,
            trigger,
            trigger_config: TriggerConfig::default(),
            conditions: Vec::new(),
            actions: Vec::new(),
            ai: AiPolicy::default(),
            run_count: 0,
            success_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_trigger_config(mut self, config: TriggerConfig) -> Self {
        self.trigger_config = config;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, spec: ActionSpec) -> Self {
        self.actions.push(spec);
        self
    }

    pub fn with_ai(mut self, ai: AiPolicy) -> Self {
        self.ai = ai;
        self
    }

    /// Structural validation applied at save time.
    pub fn validate(&self) -> crate::domain::errors::DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(crate::domain::errors::DomainError::ValidationFailed(
                "Workflow name cannot be empty".to_string(),
            ));
        }
        if self.actions.is_empty() {
            return Err(crate::domain::errors::DomainError::ValidationFailed(
                "Workflow must have at least one action".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_validate_requires_actions() {
        let wf = Workflow::new(Uuid::new_v4(), Uuid::new_v4(), "No actions", TriggerType::Manual);
        assert!(wf.validate().is_err());

        let wf = wf.with_action(ActionSpec::new(ActionConfig::AddTag {
            tags: vec!["vip".to_string()],
        }));
        assert!(wf.validate().is_ok());
    }

    #[test]
    fn test_workflow_validate_requires_name() {
        let wf = Workflow::new(Uuid::new_v4(), Uuid::new_v4(), "  ", TriggerType::Manual)
            .with_action(ActionSpec::new(ActionConfig::AiResponse { skip_existing: true }));
        assert!(wf.validate().is_err());
    }

    #[test]
    fn test_action_spec_critical_default_false() {
        let json = r#"{"type": "add_tag", "tags": ["vip"]}"#;
        let spec: ActionSpec = serde_json::from_str(json).unwrap();
        assert!(!spec.critical);
        assert_eq!(spec.kind(), ActionKind::AddTag);
    }

    #[test]
    fn test_action_config_unknown_type_rejected() {
        let json = r#"{"type": "launch_missiles", "critical": true}"#;
        let result: Result<ActionSpec, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_trigger_type_round_trip() {
        for t in [
            TriggerType::ReviewReceived,
            TriggerType::NegativeReview,
            TriggerType::PositiveReview,
            TriggerType::NegativeSentiment,
            TriggerType::Scheduled,
            TriggerType::Manual,
        ] {
            assert_eq!(TriggerType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(TriggerType::from_str("bogus"), None);
    }

    #[test]
    fn test_trigger_config_defaults() {
        let config = TriggerConfig::default();
        assert_eq!(config.negative_rating_threshold(), 2);
        assert_eq!(config.positive_rating_threshold(), 4);
        assert!((config.negative_sentiment_threshold() - 0.3).abs() < f64::EPSILON);
    }
}

//! Domain models for the reviewflow automation engine.

pub mod config;
pub mod decision;
pub mod event;
pub mod execution;
pub mod log;
pub mod review;
pub mod workflow;

pub use config::{AiConfig, Config, DatabaseConfig, LoggingConfig};
pub use decision::{AiDecision, Complexity, ResponseTone, Urgency};
pub use event::{AutomationEvent, TriggerSource};
pub use execution::{ActionOutcome, Execution, ExecutionStatus};
pub use log::{LogEntry, LogLevel};
pub use review::{
    Location, ResponseDraft, ResponseStatus, Review, SentimentSummary, Tenant, User, UserRole,
};
pub use workflow::{
    ActionConfig, ActionKind, ActionSpec, AiPolicy, AutoApprovePolicy, Condition,
    ConditionOperator, NotifyChannel, Recipient, SafetyLevel, TriggerConfig, TriggerType, Workflow,
};

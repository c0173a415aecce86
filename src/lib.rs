//! Reviewflow - Review Automation Workflow Engine
//!
//! Reviewflow is a rule-based automation engine for multi-tenant customer
//! review management: workflows pair a trigger (a review event category,
//! with thresholds) and optional conditions with an ordered list of actions,
//! and the engine runs the matching workflows against each incoming event
//! with a durable per-run audit trail.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure domain models and port traits
//! - **Service Layer** (`services`): Trigger matching, condition evaluation,
//!   the execution engine, and the AI decision & response pipeline
//! - **Action Layer** (`actions`): The registry of executable action types
//! - **Adapter Layer** (`adapters`): SQLite and in-memory port implementations
//! - **Infrastructure Layer** (`infrastructure`): External API client and
//!   configuration loading
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use reviewflow::AutomationService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire repositories, build the service, dispatch events
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use actions::{Action, ActionContext, ActionRegistry, ActionServices};
pub use domain::models::config::{AiConfig, Config, DatabaseConfig, LoggingConfig};
pub use domain::models::event::{AutomationEvent, TriggerSource};
pub use domain::models::execution::{ActionOutcome, Execution, ExecutionStatus};
pub use domain::models::workflow::{
    ActionConfig, ActionKind, ActionSpec, AiPolicy, Condition, TriggerConfig, TriggerType, Workflow,
};
pub use domain::ports::{
    ChatClient, ExecutionFilters, ExecutionRepository, LogFilters, LogRepository, Notifier,
    ReportGenerator, ResponseStore, WorkflowRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AiResponder, AutomationService, ExecutionEngine};

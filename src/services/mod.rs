pub mod ai_responder;
pub mod automation_service;
pub mod condition_evaluator;
pub mod execution_engine;
pub mod safety;
pub mod trigger_matcher;

pub use ai_responder::{AiResponder, ResponseOutcome};
pub use automation_service::{AutomationService, TenantStats, WorkflowStats};
pub use execution_engine::ExecutionEngine;

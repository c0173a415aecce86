//! Append-only diagnostic log entries tied to workflows and executions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::workflow::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Durable diagnostic record. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub execution_id: Option<Uuid>,
    pub level: LogLevel,
    pub message: String,
    /// Structured context serialized alongside the message.
    pub context: serde_json::Value,
    pub action_kind: Option<ActionKind>,
    pub action_index: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn info(workflow_id: Uuid, message: impl Into<String>) -> Self {
        Self::new(workflow_id, LogLevel::Info, message)
    }

    pub fn error(workflow_id: Uuid, message: impl Into<String>) -> Self {
        Self::new(workflow_id, LogLevel::Error, message)
    }

    fn new(workflow_id: Uuid, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            execution_id: None,
            level,
            message: message.into(),
            context: serde_json::Value::Null,
            action_kind: None,
            action_index: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_execution(mut self, execution_id: Uuid) -> Self {
        self.execution_id = Some(execution_id);
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_action(mut self, kind: ActionKind, index: usize) -> Self {
        self.action_kind = Some(kind);
        self.action_index = Some(index);
        self
    }
}

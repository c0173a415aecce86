//! Execution domain model: one run of one workflow against one event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::workflow::ActionKind;

/// Status of an execution. Transitions are monotonic:
/// pending -> running -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        matches!(
            (self, new_status),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed | Self::Failed)
        )
    }
}

/// Per-action result record, appended in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub index: usize,
    pub kind: ActionKind,
    pub success: bool,
    /// Action-specific result payload on success.
    pub output: Option<serde_json::Value>,
    /// Captured failure message.
    pub error: Option<String>,
    pub duration_ms: i64,
}

impl ActionOutcome {
    pub fn success(index: usize, kind: ActionKind, output: serde_json::Value, duration_ms: i64) -> Self {
        Self { index, kind, success: true, output: Some(output), error: None, duration_ms }
    }

    pub fn failure(index: usize, kind: ActionKind, error: impl Into<String>, duration_ms: i64) -> Self {
        Self { index, kind, success: false, output: None, error: Some(error.into()), duration_ms }
    }
}

/// One instance of running one workflow against one event.
///
/// Created at workflow-match time, mutated only by the execution engine,
/// retained indefinitely for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// What produced the event, e.g. `review:<id>` or `manual:<user-id>`.
    pub trigger_source: String,
    /// Raw snapshot of the triggering event's data.
    pub event_data: serde_json::Value,
    pub status: ExecutionStatus,
    pub actions_total: usize,
    pub actions_completed: usize,
    pub actions_failed: usize,
    pub outcomes: Vec<ActionOutcome>,
    /// Workflow-level error when the run failed.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Execution {
    pub fn new(
        workflow_id: Uuid,
        trigger_source: impl Into<String>,
        event_data: serde_json::Value,
        actions_total: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            trigger_source: trigger_source.into(),
            event_data,
            status: ExecutionStatus::Pending,
            actions_total,
            actions_completed: 0,
            actions_failed: 0,
            outcomes: Vec::new(),
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn transition_to(&mut self, new_status: ExecutionStatus) -> Result<(), String> {
        if !self.status.can_transition_to(new_status) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                new_status.as_str()
            ));
        }
        self.status = new_status;
        match new_status {
            ExecutionStatus::Running => self.started_at = Some(Utc::now()),
            ExecutionStatus::Completed | ExecutionStatus::Failed => {
                self.finished_at = Some(Utc::now());
            }
            ExecutionStatus::Pending => {}
        }
        Ok(())
    }

    /// Record one action's result and bump the matching counter.
    pub fn record_outcome(&mut self, outcome: ActionOutcome) {
        if outcome.success {
            self.actions_completed += 1;
        } else {
            self.actions_failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Wall-clock duration once the run has started.
    pub fn duration_ms(&self) -> Option<i64> {
        let started = self.started_at?;
        let finished = self.finished_at.unwrap_or_else(Utc::now);
        Some((finished - started).num_milliseconds())
    }
}

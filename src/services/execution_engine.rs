//! Workflow execution engine.
//!
//! Runs one workflow against one event: creates the execution record,
//! iterates the action list strictly in declaration order, records
//! per-action outcomes, and finalizes the status. A non-critical action
//! failure is captured and the loop continues; a critical failure fails the
//! execution and remaining actions are never attempted.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::actions::{ActionContext, ActionRegistry, ActionServices};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::AutomationEvent;
use crate::domain::models::execution::{ActionOutcome, Execution, ExecutionStatus};
use crate::domain::models::log::LogEntry;
use crate::domain::models::workflow::Workflow;
use crate::domain::ports::{ExecutionRepository, LogRepository, WorkflowRepository};

pub struct ExecutionEngine {
    registry: Arc<ActionRegistry>,
    workflows: Arc<dyn WorkflowRepository>,
    executions: Arc<dyn ExecutionRepository>,
    logs: Arc<dyn LogRepository>,
    services: Arc<ActionServices>,
}

impl ExecutionEngine {
    pub fn new(
        registry: Arc<ActionRegistry>,
        workflows: Arc<dyn WorkflowRepository>,
        executions: Arc<dyn ExecutionRepository>,
        logs: Arc<dyn LogRepository>,
        services: Arc<ActionServices>,
    ) -> Self {
        Self { registry, workflows, executions, logs, services }
    }

    /// Run one workflow against one event and return the finished execution.
    pub async fn run(&self, workflow: &Workflow, event: &AutomationEvent) -> DomainResult<Execution> {
        let mut execution = Execution::new(
            workflow.id,
            event.source.to_string(),
            event.data.clone(),
            workflow.actions.len(),
        );
        self.executions.insert(&execution).await?;

        // pending -> running, counted as a lifetime run.
        execution
            .transition_to(ExecutionStatus::Running)
            .map_err(DomainError::ExecutionFailed)?;
        self.workflows.increment_run_count(workflow.id).await?;
        self.executions.update(&execution).await?;

        info!(
            workflow_id = %workflow.id,
            execution_id = %execution.id,
            trigger_source = %execution.trigger_source,
            actions = workflow.actions.len(),
            "Execution started"
        );

        let context = ActionContext {
            workflow: workflow.clone(),
            execution_id: execution.id,
            event: event.clone(),
            data: build_context_data(workflow, event, execution.id),
            services: Arc::clone(&self.services),
        };

        let mut critical_error: Option<String> = None;

        for (index, spec) in workflow.actions.iter().enumerate() {
            let kind = spec.kind();
            self.log(
                LogEntry::info(workflow.id, format!("Executing action {index}: {kind}"))
                    .with_execution(execution.id)
                    .with_context(json!({ "config": spec.config }))
                    .with_action(kind, index),
            )
            .await;

            let started = Utc::now();
            let result = match self.registry.resolve(kind) {
                Ok(action) => action.execute(&spec.config, &context).await,
                Err(err) => Err(err),
            };
            let duration_ms = (Utc::now() - started).num_milliseconds();

            match result {
                Ok(output) => {
                    execution.record_outcome(ActionOutcome::success(index, kind, output, duration_ms));
                    self.log(
                        LogEntry::info(workflow.id, format!("Action {index} completed: {kind}"))
                            .with_execution(execution.id)
                            .with_action(kind, index),
                    )
                    .await;
                }
                Err(err) => {
                    let message = err.to_string();
                    execution.record_outcome(ActionOutcome::failure(
                        index,
                        kind,
                        message.clone(),
                        duration_ms,
                    ));
                    error!(
                        workflow_id = %workflow.id,
                        execution_id = %execution.id,
                        action = %kind,
                        index,
                        error = %message,
                        critical = spec.critical,
                        "Action failed"
                    );
                    self.log(
                        LogEntry::error(workflow.id, format!("Action {index} failed: {message}"))
                            .with_execution(execution.id)
                            .with_context(json!({ "critical": spec.critical }))
                            .with_action(kind, index),
                    )
                    .await;

                    if spec.critical {
                        critical_error = Some(message);
                        break;
                    }
                }
            }
        }

        if let Some(message) = critical_error {
            execution.error = Some(message.clone());
            execution
                .transition_to(ExecutionStatus::Failed)
                .map_err(DomainError::ExecutionFailed)?;
            self.executions.update(&execution).await?;
            self.log(
                LogEntry::error(workflow.id, format!("Execution failed: {message}"))
                    .with_execution(execution.id),
            )
            .await;
            return Ok(execution);
        }

        execution
            .transition_to(ExecutionStatus::Completed)
            .map_err(DomainError::ExecutionFailed)?;
        self.executions.update(&execution).await?;
        self.workflows.increment_success_count(workflow.id).await?;

        info!(
            workflow_id = %workflow.id,
            execution_id = %execution.id,
            completed = execution.actions_completed,
            failed = execution.actions_failed,
            duration_ms = execution.duration_ms(),
            "Execution completed"
        );

        Ok(execution)
    }

    /// Durable log append; a logging failure never fails the run.
    async fn log(&self, entry: LogEntry) {
        if let Err(err) = self.logs.append(&entry).await {
            error!(error = %err, "Failed to append workflow log entry");
        }
    }
}

/// Event data merged with the serialized workflow and execution identity.
/// This is what actions see as their context.
fn build_context_data(workflow: &Workflow, event: &AutomationEvent, execution_id: Uuid) -> serde_json::Value {
    let mut data = match &event.data {
        serde_json::Value::Object(map) => map.clone(),
        other => {
            let mut map = serde_json::Map::new();
            if !other.is_null() {
                map.insert("event".to_string(), other.clone());
            }
            map
        }
    };
    data.insert("execution_id".to_string(), json!(execution_id));
    data.insert(
        "workflow".to_string(),
        json!({
            "id": workflow.id,
            "name": workflow.name,
            "tenant_id": workflow.tenant_id,
            "trigger": workflow.trigger,
        }),
    );
    if let Some(review_id) = event.review_id {
        data.insert("review_id".to_string(), json!(review_id));
    }
    if let Some(location_id) = event.location_id {
        data.insert("location_id".to_string(), json!(location_id));
    }
    serde_json::Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::workflow::TriggerType;

    #[test]
    fn test_context_data_merges_identity() {
        let workflow = Workflow::new(Uuid::new_v4(), Uuid::new_v4(), "wf", TriggerType::Manual);
        let event = AutomationEvent::manual(
            Uuid::new_v4(),
            workflow.tenant_id,
            json!({ "rating": 5 }),
        );
        let execution_id = Uuid::new_v4();

        let data = build_context_data(&workflow, &event, execution_id);
        assert_eq!(data["rating"], json!(5));
        assert_eq!(data["execution_id"], json!(execution_id));
        assert_eq!(data["workflow"]["name"], json!("wf"));
    }
}

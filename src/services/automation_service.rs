//! Automation service: the application facade.
//!
//! Owns workflow CRUD with validation, event dispatch (tenant resolution,
//! trigger matching, condition evaluation), and read APIs over the
//! execution history. One workflow crashing never prevents the remaining
//! matched workflows from running.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actions::ActionRegistry;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::event::AutomationEvent;
use crate::domain::models::execution::{Execution, ExecutionStatus};
use crate::domain::models::log::LogEntry;
use crate::domain::models::workflow::Workflow;
use crate::domain::ports::{
    ExecutionFilters, ExecutionRepository, LogFilters, LogRepository, TenantDirectory,
    WorkflowRepository,
};
use crate::services::condition_evaluator::matches_conditions;
use crate::services::execution_engine::ExecutionEngine;
use crate::services::trigger_matcher;

/// Aggregate counters for one workflow's history.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStats {
    pub workflow_id: Uuid,
    pub run_count: u64,
    pub success_count: u64,
    pub recent_executions: i64,
    pub recent_failures: i64,
}

/// Aggregate counters across one tenant's workflows.
#[derive(Debug, Clone, Serialize)]
pub struct TenantStats {
    pub tenant_id: Uuid,
    pub total_workflows: usize,
    pub active_workflows: usize,
    pub total_executions: i64,
    pub completed_executions: i64,
    pub failed_executions: i64,
}

pub struct AutomationService {
    workflows: Arc<dyn WorkflowRepository>,
    executions: Arc<dyn ExecutionRepository>,
    logs: Arc<dyn LogRepository>,
    tenants: Arc<dyn TenantDirectory>,
    registry: Arc<ActionRegistry>,
    engine: Arc<ExecutionEngine>,
}

impl AutomationService {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        executions: Arc<dyn ExecutionRepository>,
        logs: Arc<dyn LogRepository>,
        tenants: Arc<dyn TenantDirectory>,
        registry: Arc<ActionRegistry>,
        engine: Arc<ExecutionEngine>,
    ) -> Self {
        Self { workflows, executions, logs, tenants, registry, engine }
    }

    // ---- workflow CRUD ----

    /// Validate and persist a new workflow.
    pub async fn create_workflow(&self, workflow: Workflow) -> DomainResult<Workflow> {
        self.validate_workflow(&workflow)?;
        self.workflows.insert(&workflow).await?;
        info!(workflow_id = %workflow.id, name = %workflow.name, "Workflow created");
        Ok(workflow)
    }

    pub async fn get_workflow(&self, id: Uuid) -> DomainResult<Workflow> {
        self.workflows
            .get(id)
            .await?
            .ok_or(DomainError::WorkflowNotFound(id))
    }

    /// Validate and persist changes to an existing workflow.
    pub async fn update_workflow(&self, mut workflow: Workflow) -> DomainResult<Workflow> {
        self.get_workflow(workflow.id).await?;
        self.validate_workflow(&workflow)?;
        workflow.updated_at = chrono::Utc::now();
        self.workflows.update(&workflow).await?;
        Ok(workflow)
    }

    pub async fn delete_workflow(&self, id: Uuid) -> DomainResult<()> {
        self.get_workflow(id).await?;
        self.workflows.delete(id).await?;
        info!(workflow_id = %id, "Workflow deleted");
        Ok(())
    }

    pub async fn list_workflows(&self, tenant_id: Uuid) -> DomainResult<Vec<Workflow>> {
        self.workflows.list_by_tenant(tenant_id).await
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> DomainResult<Workflow> {
        let mut workflow = self.get_workflow(id).await?;
        workflow.is_active = active;
        workflow.updated_at = chrono::Utc::now();
        self.workflows.update(&workflow).await?;
        Ok(workflow)
    }

    /// Structural validation plus per-action configuration checks against
    /// the registry.
    fn validate_workflow(&self, workflow: &Workflow) -> DomainResult<()> {
        workflow.validate()?;
        for (index, spec) in workflow.actions.iter().enumerate() {
            let problems = self.registry.validate(&spec.config)?;
            if !problems.is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "action {index} ({}): {}",
                    spec.kind(),
                    problems.join("; ")
                )));
            }
        }
        Ok(())
    }

    // ---- dispatch ----

    /// Dispatch one event: resolve the tenant, select matching active
    /// workflows, and run each through the engine.
    ///
    /// Returns the executions it started, in selection order. A workflow
    /// whose run errors is logged and skipped; it never blocks the rest.
    pub async fn dispatch(&self, event: &AutomationEvent) -> DomainResult<Vec<Execution>> {
        let Some(tenant_id) = self.resolve_tenant(event).await? else {
            warn!(trigger = %event.trigger.as_str(), source = %event.source, "Event has no resolvable tenant, dropping");
            return Ok(Vec::new());
        };

        // A review event is matched against every review-category trigger;
        // each workflow's own thresholds decide whether it fires.
        let mut candidates = Vec::new();
        for trigger in trigger_matcher::selection_triggers(event.trigger) {
            candidates.extend(
                self.workflows
                    .list_active_by_trigger(tenant_id, trigger)
                    .await?,
            );
        }
        candidates.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let mut executions = Vec::new();
        for workflow in &candidates {
            if !trigger_matcher::matches(workflow.trigger, &workflow.trigger_config, event) {
                continue;
            }
            if !matches_conditions(&workflow.conditions, &event.data) {
                debug!(workflow_id = %workflow.id, "Conditions not met, skipping");
                continue;
            }

            match self.engine.run(workflow, event).await {
                Ok(execution) => executions.push(execution),
                Err(err) => {
                    warn!(workflow_id = %workflow.id, error = %err, "Workflow run failed");
                    let entry = LogEntry::error(
                        workflow.id,
                        format!("Dispatch could not complete the run: {err}"),
                    );
                    if let Err(log_err) = self.logs.append(&entry).await {
                        warn!(error = %log_err, "Failed to append workflow log entry");
                    }
                }
            }
        }

        info!(
            tenant_id = %tenant_id,
            trigger = %event.trigger.as_str(),
            candidates = candidates.len(),
            started = executions.len(),
            "Event dispatched"
        );
        Ok(executions)
    }

    /// Tenant resolution order: explicit on the event, then via the review,
    /// then via the location.
    async fn resolve_tenant(&self, event: &AutomationEvent) -> DomainResult<Option<Uuid>> {
        if let Some(tenant_id) = event.tenant_id {
            return Ok(Some(tenant_id));
        }
        if let Some(review_id) = event.review_id {
            if let Some(tenant) = self.tenants.by_review(review_id).await? {
                return Ok(Some(tenant.id));
            }
        }
        if let Some(location_id) = event.location_id {
            if let Some(tenant) = self.tenants.by_location(location_id).await? {
                return Ok(Some(tenant.id));
            }
        }
        Ok(None)
    }

    // ---- history ----

    pub async fn get_execution(&self, id: Uuid) -> DomainResult<Execution> {
        self.executions
            .get(id)
            .await?
            .ok_or(DomainError::ExecutionNotFound(id))
    }

    pub async fn list_executions(&self, filters: ExecutionFilters) -> DomainResult<Vec<Execution>> {
        self.executions.list(filters).await
    }

    pub async fn list_logs(&self, filters: LogFilters) -> DomainResult<Vec<LogEntry>> {
        self.logs.list(filters).await
    }

    /// Lifetime counters plus a recent window over the execution history.
    pub async fn workflow_stats(&self, id: Uuid) -> DomainResult<WorkflowStats> {
        let workflow = self.get_workflow(id).await?;
        let since = chrono::Utc::now() - chrono::Duration::days(30);

        let recent_executions = self
            .executions
            .count(ExecutionFilters {
                workflow_id: Some(id),
                since: Some(since),
                ..Default::default()
            })
            .await?;
        let recent_failures = self
            .executions
            .count(ExecutionFilters {
                workflow_id: Some(id),
                status: Some(ExecutionStatus::Failed),
                since: Some(since),
                ..Default::default()
            })
            .await?;

        Ok(WorkflowStats {
            workflow_id: id,
            run_count: workflow.run_count,
            success_count: workflow.success_count,
            recent_executions,
            recent_failures,
        })
    }

    /// Aggregate counts over all of a tenant's workflows and their
    /// execution history.
    pub async fn tenant_stats(&self, tenant_id: Uuid) -> DomainResult<TenantStats> {
        let workflows = self.workflows.list_by_tenant(tenant_id).await?;
        let active_workflows = workflows.iter().filter(|w| w.is_active).count();

        let mut total_executions = 0;
        let mut completed_executions = 0;
        let mut failed_executions = 0;
        for workflow in &workflows {
            total_executions += self
                .executions
                .count(ExecutionFilters {
                    workflow_id: Some(workflow.id),
                    ..Default::default()
                })
                .await?;
            completed_executions += self
                .executions
                .count(ExecutionFilters {
                    workflow_id: Some(workflow.id),
                    status: Some(ExecutionStatus::Completed),
                    ..Default::default()
                })
                .await?;
            failed_executions += self
                .executions
                .count(ExecutionFilters {
                    workflow_id: Some(workflow.id),
                    status: Some(ExecutionStatus::Failed),
                    ..Default::default()
                })
                .await?;
        }

        Ok(TenantStats {
            tenant_id,
            total_workflows: workflows.len(),
            active_workflows,
            total_executions,
            completed_executions,
            failed_executions,
        })
    }
}

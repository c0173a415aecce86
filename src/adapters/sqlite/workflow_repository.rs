//! SQLite implementation of the WorkflowRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::workflow::{TriggerType, Workflow};
use crate::domain::ports::WorkflowRepository;

#[derive(Clone)]
pub struct SqliteWorkflowRepository {
    pool: SqlitePool,
}

impl SqliteWorkflowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WorkflowRow {
    id: String,
    tenant_id: String,
    created_by: String,
    name: String,
    description: String,
    is_active: i32,
    priority: i32,
    trigger_type: String,
    trigger_config: String,
    conditions: String,
    actions: String,
    ai_policy: String,
    run_count: i64,
    success_count: i64,
    created_at: String,
    updated_at: String,
}

fn row_to_workflow(row: WorkflowRow) -> DomainResult<Workflow> {
    let trigger = TriggerType::from_str(&row.trigger_type).ok_or_else(|| {
        DomainError::SerializationError(format!("Unknown trigger type: {}", row.trigger_type))
    })?;

    Ok(Workflow {
        id: parse_uuid(&row.id)?,
        tenant_id: parse_uuid(&row.tenant_id)?,
        created_by: parse_uuid(&row.created_by)?,
        name: row.name,
        description: row.description,
        is_active: row.is_active != 0,
        priority: row.priority,
        trigger,
        trigger_config: serde_json::from_str(&row.trigger_config)?,
        conditions: serde_json::from_str(&row.conditions)?,
        actions: serde_json::from_str(&row.actions)?,
        ai: serde_json::from_str(&row.ai_policy)?,
        run_count: row.run_count as u64,
        success_count: row.success_count as u64,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[async_trait]
impl WorkflowRepository for SqliteWorkflowRepository {
    async fn insert(&self, workflow: &Workflow) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO workflows
               (id, tenant_id, created_by, name, description, is_active, priority,
                trigger_type, trigger_config, conditions, actions, ai_policy,
                run_count, success_count, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(workflow.id.to_string())
        .bind(workflow.tenant_id.to_string())
        .bind(workflow.created_by.to_string())
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(if workflow.is_active { 1i32 } else { 0i32 })
        .bind(workflow.priority)
        .bind(workflow.trigger.as_str())
        .bind(serde_json::to_string(&workflow.trigger_config)?)
        .bind(serde_json::to_string(&workflow.conditions)?)
        .bind(serde_json::to_string(&workflow.actions)?)
        .bind(serde_json::to_string(&workflow.ai)?)
        .bind(workflow.run_count as i64)
        .bind(workflow.success_count as i64)
        .bind(workflow.created_at.to_rfc3339())
        .bind(workflow.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Workflow>> {
        let row: Option<WorkflowRow> = sqlx::query_as("SELECT * FROM workflows WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_workflow).transpose()
    }

    async fn update(&self, workflow: &Workflow) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE workflows SET
               name = ?, description = ?, is_active = ?, priority = ?,
               trigger_type = ?, trigger_config = ?, conditions = ?, actions = ?,
               ai_policy = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(if workflow.is_active { 1i32 } else { 0i32 })
        .bind(workflow.priority)
        .bind(workflow.trigger.as_str())
        .bind(serde_json::to_string(&workflow.trigger_config)?)
        .bind(serde_json::to_string(&workflow.conditions)?)
        .bind(serde_json::to_string(&workflow.actions)?)
        .bind(serde_json::to_string(&workflow.ai)?)
        .bind(workflow.updated_at.to_rfc3339())
        .bind(workflow.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WorkflowNotFound(workflow.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> DomainResult<Vec<Workflow>> {
        let rows: Vec<WorkflowRow> = sqlx::query_as(
            "SELECT * FROM workflows WHERE tenant_id = ? ORDER BY priority DESC, created_at DESC",
        )
        .bind(tenant_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_workflow).collect()
    }

    async fn list_active_by_trigger(
        &self,
        tenant_id: Uuid,
        trigger: TriggerType,
    ) -> DomainResult<Vec<Workflow>> {
        let rows: Vec<WorkflowRow> = sqlx::query_as(
            r#"SELECT * FROM workflows
               WHERE tenant_id = ? AND trigger_type = ? AND is_active = 1
               ORDER BY priority DESC, created_at DESC"#,
        )
        .bind(tenant_id.to_string())
        .bind(trigger.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_workflow).collect()
    }

    async fn increment_run_count(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE workflows SET run_count = run_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_success_count(&self, id: Uuid) -> DomainResult<()> {
        sqlx::query("UPDATE workflows SET success_count = success_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

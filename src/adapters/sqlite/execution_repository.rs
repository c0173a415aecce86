//! SQLite implementation of the ExecutionRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::execution::{Execution, ExecutionStatus};
use crate::domain::ports::{ExecutionFilters, ExecutionRepository};

#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    workflow_id: String,
    trigger_source: String,
    event_data: String,
    status: String,
    actions_total: i64,
    actions_completed: i64,
    actions_failed: i64,
    outcomes: String,
    error: Option<String>,
    created_at: String,
    started_at: Option<String>,
    finished_at: Option<String>,
}

fn row_to_execution(row: ExecutionRow) -> DomainResult<Execution> {
    let status = ExecutionStatus::from_str(&row.status).ok_or_else(|| {
        DomainError::SerializationError(format!("Unknown execution status: {}", row.status))
    })?;

    Ok(Execution {
        id: parse_uuid(&row.id)?,
        workflow_id: parse_uuid(&row.workflow_id)?,
        trigger_source: row.trigger_source,
        event_data: serde_json::from_str(&row.event_data)?,
        status,
        actions_total: row.actions_total as usize,
        actions_completed: row.actions_completed as usize,
        actions_failed: row.actions_failed as usize,
        outcomes: serde_json::from_str(&row.outcomes)?,
        error: row.error,
        created_at: parse_datetime(&row.created_at)?,
        started_at: parse_optional_datetime(row.started_at)?,
        finished_at: parse_optional_datetime(row.finished_at)?,
    })
}

/// Filter values come from typed fields (UUIDs, enum strings, RFC3339
/// timestamps), never raw user text.
fn filter_clauses(filters: &ExecutionFilters) -> String {
    let mut sql = String::from(" WHERE 1=1");
    if let Some(workflow_id) = filters.workflow_id {
        sql.push_str(&format!(" AND workflow_id = '{workflow_id}'"));
    }
    if let Some(status) = filters.status {
        sql.push_str(&format!(" AND status = '{}'", status.as_str()));
    }
    if let Some(since) = filters.since {
        sql.push_str(&format!(" AND created_at >= '{}'", since.to_rfc3339()));
    }
    if let Some(until) = filters.until {
        sql.push_str(&format!(" AND created_at <= '{}'", until.to_rfc3339()));
    }
    sql
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn insert(&self, execution: &Execution) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO executions
               (id, workflow_id, trigger_source, event_data, status,
                actions_total, actions_completed, actions_failed, outcomes,
                error, created_at, started_at, finished_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(execution.id.to_string())
        .bind(execution.workflow_id.to_string())
        .bind(&execution.trigger_source)
        .bind(serde_json::to_string(&execution.event_data)?)
        .bind(execution.status.as_str())
        .bind(execution.actions_total as i64)
        .bind(execution.actions_completed as i64)
        .bind(execution.actions_failed as i64)
        .bind(serde_json::to_string(&execution.outcomes)?)
        .bind(&execution.error)
        .bind(execution.created_at.to_rfc3339())
        .bind(execution.started_at.map(|t| t.to_rfc3339()))
        .bind(execution.finished_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, execution: &Execution) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE executions SET
               status = ?, actions_completed = ?, actions_failed = ?,
               outcomes = ?, error = ?, started_at = ?, finished_at = ?
               WHERE id = ?"#,
        )
        .bind(execution.status.as_str())
        .bind(execution.actions_completed as i64)
        .bind(execution.actions_failed as i64)
        .bind(serde_json::to_string(&execution.outcomes)?)
        .bind(&execution.error)
        .bind(execution.started_at.map(|t| t.to_rfc3339()))
        .bind(execution.finished_at.map(|t| t.to_rfc3339()))
        .bind(execution.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ExecutionNotFound(execution.id));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Execution>> {
        let row: Option<ExecutionRow> = sqlx::query_as("SELECT * FROM executions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_execution).transpose()
    }

    async fn list(&self, filters: ExecutionFilters) -> DomainResult<Vec<Execution>> {
        let mut sql = String::from("SELECT * FROM executions");
        sql.push_str(&filter_clauses(&filters));
        sql.push_str(" ORDER BY created_at DESC");
        if let Some(limit) = filters.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows: Vec<ExecutionRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_execution).collect()
    }

    async fn count(&self, filters: ExecutionFilters) -> DomainResult<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM executions");
        sql.push_str(&filter_clauses(&filters));

        let result: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(result.0)
    }
}

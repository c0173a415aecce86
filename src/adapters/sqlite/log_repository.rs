//! SQLite implementation of the append-only LogRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{parse_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::log::{LogEntry, LogLevel};
use crate::domain::models::workflow::ActionKind;
use crate::domain::ports::{LogFilters, LogRepository};

#[derive(Clone)]
pub struct SqliteLogRepository {
    pool: SqlitePool,
}

impl SqliteLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: String,
    workflow_id: String,
    execution_id: Option<String>,
    level: String,
    message: String,
    context: String,
    action_kind: Option<String>,
    action_index: Option<i64>,
    created_at: String,
}

fn row_to_entry(row: LogRow) -> DomainResult<LogEntry> {
    let level = LogLevel::from_str(&row.level).ok_or_else(|| {
        DomainError::SerializationError(format!("Unknown log level: {}", row.level))
    })?;
    let action_kind = row
        .action_kind
        .map(|k| {
            serde_json::from_value::<ActionKind>(serde_json::Value::String(k.clone()))
                .map_err(|_| DomainError::SerializationError(format!("Unknown action kind: {k}")))
        })
        .transpose()?;

    Ok(LogEntry {
        id: parse_uuid(&row.id)?,
        workflow_id: parse_uuid(&row.workflow_id)?,
        execution_id: parse_optional_uuid(row.execution_id)?,
        level,
        message: row.message,
        context: serde_json::from_str(&row.context)?,
        action_kind,
        action_index: row.action_index.map(|i| i as usize),
        created_at: parse_datetime(&row.created_at)?,
    })
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn append(&self, entry: &LogEntry) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO workflow_logs
               (id, workflow_id, execution_id, level, message, context,
                action_kind, action_index, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(entry.workflow_id.to_string())
        .bind(entry.execution_id.map(|id| id.to_string()))
        .bind(entry.level.as_str())
        .bind(&entry.message)
        .bind(serde_json::to_string(&entry.context)?)
        .bind(entry.action_kind.map(|k| k.as_str()))
        .bind(entry.action_index.map(|i| i as i64))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, filters: LogFilters) -> DomainResult<Vec<LogEntry>> {
        let mut sql = String::from("SELECT * FROM workflow_logs WHERE 1=1");
        if let Some(workflow_id) = filters.workflow_id {
            sql.push_str(&format!(" AND workflow_id = '{workflow_id}'"));
        }
        if let Some(execution_id) = filters.execution_id {
            sql.push_str(&format!(" AND execution_id = '{execution_id}'"));
        }
        if let Some(level) = filters.level {
            sql.push_str(&format!(" AND level = '{}'", level.as_str()));
        }
        if let Some(since) = filters.since {
            sql.push_str(&format!(" AND created_at >= '{}'", since.to_rfc3339()));
        }
        sql.push_str(" ORDER BY created_at DESC");
        if let Some(limit) = filters.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows: Vec<LogRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_entry).collect()
    }
}

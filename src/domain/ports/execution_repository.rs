use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::execution::{Execution, ExecutionStatus};
use crate::domain::models::log::{LogEntry, LogLevel};

/// Filters for querying the execution history.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilters {
    pub workflow_id: Option<Uuid>,
    pub status: Option<ExecutionStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Repository port for the durable execution history.
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn insert(&self, execution: &Execution) -> DomainResult<()>;

    async fn update(&self, execution: &Execution) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Execution>>;

    async fn list(&self, filters: ExecutionFilters) -> DomainResult<Vec<Execution>>;

    /// Count executions matching the filters.
    async fn count(&self, filters: ExecutionFilters) -> DomainResult<i64>;
}

/// Filters for querying durable log entries.
#[derive(Debug, Clone, Default)]
pub struct LogFilters {
    pub workflow_id: Option<Uuid>,
    pub execution_id: Option<Uuid>,
    pub level: Option<LogLevel>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

/// Append-only repository port for workflow log entries.
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> DomainResult<()>;

    async fn list(&self, filters: LogFilters) -> DomainResult<Vec<LogEntry>>;
}

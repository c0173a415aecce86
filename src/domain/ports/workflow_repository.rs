use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::workflow::{TriggerType, Workflow};

/// Repository port for workflow persistence.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn insert(&self, workflow: &Workflow) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Workflow>>;

    async fn update(&self, workflow: &Workflow) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// All workflows for a tenant, any state.
    async fn list_by_tenant(&self, tenant_id: Uuid) -> DomainResult<Vec<Workflow>>;

    /// Active workflows for a tenant and trigger type, ordered by priority
    /// descending then creation time descending.
    async fn list_active_by_trigger(
        &self,
        tenant_id: Uuid,
        trigger: TriggerType,
    ) -> DomainResult<Vec<Workflow>>;

    /// Increment the lifetime run counter.
    async fn increment_run_count(&self, id: Uuid) -> DomainResult<()>;

    /// Increment the lifetime success counter.
    async fn increment_success_count(&self, id: Uuid) -> DomainResult<()>;
}

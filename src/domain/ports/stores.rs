//! Collaborator store ports.
//!
//! The engine consumes these as capability interfaces; their persistence
//! technology is outside the core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::review::{Location, ResponseDraft, Review, Tenant, User};

/// Resolves the owning tenant for incoming events.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn by_id(&self, id: Uuid) -> DomainResult<Option<Tenant>>;

    /// Tenant owning a review, resolved via its location.
    async fn by_review(&self, review_id: Uuid) -> DomainResult<Option<Tenant>>;

    /// Tenant owning a location.
    async fn by_location(&self, location_id: Uuid) -> DomainResult<Option<Tenant>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Review>>;

    /// Persist mutated review fields (tags metadata).
    async fn update(&self, review: &Review) -> DomainResult<()>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Location>>;

    async fn update(&self, location: &Location) -> DomainResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Admin users of a tenant, for role-based notification recipients.
    async fn admins_of_tenant(&self, tenant_id: Uuid) -> DomainResult<Vec<User>>;
}

/// Store for draft responses.
///
/// `find_or_create` is an atomic upsert keyed on `review_id`: two concurrent
/// callers must observe the same row. This is the storage-level uniqueness
/// that keeps concurrently matched workflows from double-creating drafts.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn find_by_review(&self, review_id: Uuid) -> DomainResult<Option<ResponseDraft>>;

    async fn find_or_create(&self, review_id: Uuid) -> DomainResult<ResponseDraft>;

    async fn update(&self, response: &ResponseDraft) -> DomainResult<()>;
}

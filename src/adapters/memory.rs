//! In-memory adapters for the collaborator store ports.
//!
//! Backed by `tokio::sync::RwLock` maps. Used for local runs without the
//! surrounding platform and for integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::review::{Location, ResponseDraft, Review, Tenant, User, UserRole};
use crate::domain::ports::report_generator::{ReportHandle, ReportSpec};
use crate::domain::ports::{
    LocationStore, Notifier, ReportGenerator, ResponseStore, ReviewStore, TenantDirectory,
    UserStore,
};

#[derive(Default)]
pub struct InMemoryTenantDirectory {
    tenants: RwLock<HashMap<Uuid, Tenant>>,
    review_tenants: RwLock<HashMap<Uuid, Uuid>>,
    location_tenants: RwLock<HashMap<Uuid, Uuid>>,
}

impl InMemoryTenantDirectory {
    pub async fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn link_review(&self, review_id: Uuid, tenant_id: Uuid) {
        self.review_tenants.write().await.insert(review_id, tenant_id);
    }

    pub async fn link_location(&self, location_id: Uuid, tenant_id: Uuid) {
        self.location_tenants.write().await.insert(location_id, tenant_id);
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn by_id(&self, id: Uuid) -> DomainResult<Option<Tenant>> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn by_review(&self, review_id: Uuid) -> DomainResult<Option<Tenant>> {
        let tenant_id = self.review_tenants.read().await.get(&review_id).copied();
        match tenant_id {
            Some(id) => self.by_id(id).await,
            None => Ok(None),
        }
    }

    async fn by_location(&self, location_id: Uuid) -> DomainResult<Option<Tenant>> {
        let tenant_id = self.location_tenants.read().await.get(&location_id).copied();
        match tenant_id {
            Some(id) => self.by_id(id).await,
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryReviewStore {
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl InMemoryReviewStore {
    pub async fn insert(&self, review: Review) {
        self.reviews.write().await.insert(review.id, review);
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Review>> {
        Ok(self.reviews.read().await.get(&id).cloned())
    }

    async fn update(&self, review: &Review) -> DomainResult<()> {
        let mut reviews = self.reviews.write().await;
        if !reviews.contains_key(&review.id) {
            return Err(DomainError::ReviewNotFound(review.id));
        }
        reviews.insert(review.id, review.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryLocationStore {
    locations: RwLock<HashMap<Uuid, Location>>,
}

impl InMemoryLocationStore {
    pub async fn insert(&self, location: Location) {
        self.locations.write().await.insert(location.id, location);
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Location>> {
        Ok(self.locations.read().await.get(&id).cloned())
    }

    async fn update(&self, location: &Location) -> DomainResult<()> {
        let mut locations = self.locations.write().await;
        if !locations.contains_key(&location.id) {
            return Err(DomainError::LocationNotFound(location.id));
        }
        locations.insert(location.id, location.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn admins_of_tenant(&self, tenant_id: Uuid) -> DomainResult<Vec<User>> {
        let users = self.users.read().await;
        let mut admins: Vec<User> = users
            .values()
            .filter(|u| u.tenant_id == tenant_id && u.role == UserRole::Admin)
            .cloned()
            .collect();
        admins.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(admins)
    }
}

/// Keyed on `review_id`; the single write lock makes `find_or_create`
/// an atomic upsert.
#[derive(Default)]
pub struct InMemoryResponseStore {
    responses: RwLock<HashMap<Uuid, ResponseDraft>>,
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn find_by_review(&self, review_id: Uuid) -> DomainResult<Option<ResponseDraft>> {
        Ok(self.responses.read().await.get(&review_id).cloned())
    }

    async fn find_or_create(&self, review_id: Uuid) -> DomainResult<ResponseDraft> {
        let mut responses = self.responses.write().await;
        let draft = responses
            .entry(review_id)
            .or_insert_with(|| ResponseDraft::new(review_id));
        Ok(draft.clone())
    }

    async fn update(&self, response: &ResponseDraft) -> DomainResult<()> {
        let mut responses = self.responses.write().await;
        responses.insert(response.review_id, response.clone());
        Ok(())
    }
}

/// A delivered notification, captured for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum SentNotification {
    Email { address: String, subject: String, body: String },
    Slack { channel: String, message: String },
    Webhook { url: String, payload: serde_json::Value },
}

/// Records deliveries instead of sending them. `fail_all` turns every send
/// into an error, for exercising delivery-failure paths.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RwLock<Vec<SentNotification>>,
    fail_all: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> DomainResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(DomainError::NotificationFailed(
                "transport unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, address: &str, subject: &str, body: &str) -> DomainResult<()> {
        self.check()?;
        self.sent.write().await.push(SentNotification::Email {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_slack(&self, channel: &str, message: &str) -> DomainResult<()> {
        self.check()?;
        self.sent.write().await.push(SentNotification::Slack {
            channel: channel.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn send_webhook(&self, url: &str, payload: &serde_json::Value) -> DomainResult<()> {
        self.check()?;
        self.sent.write().await.push(SentNotification::Webhook {
            url: url.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

/// Accepts report requests and hands back pending handles.
#[derive(Default)]
pub struct InMemoryReportGenerator {
    pub requests: RwLock<Vec<(Uuid, Uuid, ReportSpec)>>,
}

#[async_trait]
impl ReportGenerator for InMemoryReportGenerator {
    async fn generate(
        &self,
        tenant_id: Uuid,
        requested_by: Uuid,
        spec: ReportSpec,
    ) -> DomainResult<ReportHandle> {
        self.requests
            .write()
            .await
            .push((tenant_id, requested_by, spec));
        Ok(ReportHandle {
            id: Uuid::new_v4(),
            status: "pending".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_or_create_returns_same_draft() {
        let store = InMemoryResponseStore::default();
        let review_id = Uuid::new_v4();

        let first = store.find_or_create(review_id).await.unwrap();
        let second = store.find_or_create(review_id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_recording_notifier_fail_all() {
        let notifier = RecordingNotifier::default();
        notifier.set_fail_all(true);
        assert!(notifier.send_email("a@b.c", "s", "b").await.is_err());

        notifier.set_fail_all(false);
        notifier.send_email("a@b.c", "s", "b").await.unwrap();
        assert_eq!(notifier.sent.read().await.len(), 1);
    }
}

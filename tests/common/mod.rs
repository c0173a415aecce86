//! Shared fixtures for integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use reviewflow::actions::{ActionRegistry, ActionServices};
use reviewflow::adapters::memory::{
    InMemoryLocationStore, InMemoryReportGenerator, InMemoryResponseStore, InMemoryReviewStore,
    InMemoryTenantDirectory, InMemoryUserStore, RecordingNotifier,
};
use reviewflow::adapters::sqlite::{
    create_migrated_test_pool, SqliteExecutionRepository, SqliteLogRepository,
    SqliteWorkflowRepository,
};
use reviewflow::domain::errors::{DomainError, DomainResult};
use reviewflow::domain::models::review::{Location, Review, Tenant, User, UserRole};
use reviewflow::domain::ports::drafter::{DraftParams, ResponseDrafter};
use reviewflow::domain::ports::{ChatClient, ChatError, ChatRequest};
use reviewflow::services::{AiResponder, AutomationService, ExecutionEngine};

/// Chat client that always replies with a fixed string.
pub struct StaticChatClient {
    pub reply: String,
}

#[async_trait]
impl ChatClient for StaticChatClient {
    async fn complete(&self, _request: ChatRequest) -> Result<String, ChatError> {
        Ok(self.reply.clone())
    }
}

/// Chat client that always fails with a server error.
pub struct FailingChatClient;

#[async_trait]
impl ChatClient for FailingChatClient {
    async fn complete(&self, _request: ChatRequest) -> Result<String, ChatError> {
        Err(ChatError::ServerError {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

/// Drafter that returns a fixed text, or nothing.
pub struct StaticDrafter {
    pub text: Option<String>,
}

#[async_trait]
impl ResponseDrafter for StaticDrafter {
    async fn draft(
        &self,
        _review: &Review,
        _user: Option<&User>,
        _params: &DraftParams,
    ) -> DomainResult<Option<String>> {
        Ok(self.text.clone())
    }
}

/// Drafter that records the sign-off user of every request.
pub struct CapturingDrafter {
    pub text: String,
    pub seen_users: tokio::sync::Mutex<Vec<Option<String>>>,
}

impl CapturingDrafter {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            seen_users: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ResponseDrafter for CapturingDrafter {
    async fn draft(
        &self,
        _review: &Review,
        user: Option<&User>,
        _params: &DraftParams,
    ) -> DomainResult<Option<String>> {
        self.seen_users
            .lock()
            .await
            .push(user.map(|u| u.name.clone()));
        Ok(Some(self.text.clone()))
    }
}

/// Drafter whose transport always fails.
pub struct FailingDrafter;

#[async_trait]
impl ResponseDrafter for FailingDrafter {
    async fn draft(
        &self,
        _review: &Review,
        _user: Option<&User>,
        _params: &DraftParams,
    ) -> DomainResult<Option<String>> {
        Err(DomainError::ExecutionFailed("drafting service down".to_string()))
    }
}

/// Fully wired engine over in-memory collaborator stores and an in-memory
/// SQLite audit surface.
pub struct TestEnv {
    pub workflows: Arc<SqliteWorkflowRepository>,
    pub executions: Arc<SqliteExecutionRepository>,
    pub logs: Arc<SqliteLogRepository>,
    pub tenants: Arc<InMemoryTenantDirectory>,
    pub reviews: Arc<InMemoryReviewStore>,
    pub locations: Arc<InMemoryLocationStore>,
    pub users: Arc<InMemoryUserStore>,
    pub responses: Arc<InMemoryResponseStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub reports: Arc<InMemoryReportGenerator>,
    pub service: AutomationService,
}

/// Build a test environment with the given AI collaborators. `chat: None`
/// means no API credential is configured.
pub async fn setup(
    chat: Option<Arc<dyn ChatClient>>,
    drafter: Arc<dyn ResponseDrafter>,
) -> TestEnv {
    let pool = create_migrated_test_pool().await.unwrap();
    let workflows = Arc::new(SqliteWorkflowRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let logs = Arc::new(SqliteLogRepository::new(pool));

    let tenants = Arc::new(InMemoryTenantDirectory::default());
    let reviews = Arc::new(InMemoryReviewStore::default());
    let locations = Arc::new(InMemoryLocationStore::default());
    let users = Arc::new(InMemoryUserStore::default());
    let responses = Arc::new(InMemoryResponseStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let reports = Arc::new(InMemoryReportGenerator::default());

    let responder = Arc::new(AiResponder::new(chat, drafter, responses.clone()));

    let services = Arc::new(ActionServices {
        reviews: reviews.clone(),
        locations: locations.clone(),
        users: users.clone(),
        responses: responses.clone(),
        notifier: notifier.clone(),
        reports: reports.clone(),
        responder,
    });

    let registry = Arc::new(ActionRegistry::builtin());
    let engine = Arc::new(ExecutionEngine::new(
        registry.clone(),
        workflows.clone(),
        executions.clone(),
        logs.clone(),
        services,
    ));
    let service = AutomationService::new(
        workflows.clone(),
        executions.clone(),
        logs.clone(),
        tenants.clone(),
        registry,
        engine,
    );

    TestEnv {
        workflows,
        executions,
        logs,
        tenants,
        reviews,
        locations,
        users,
        responses,
        notifier,
        reports,
        service,
    }
}

/// Environment with no AI credential and a drafter that produces nothing.
pub async fn setup_without_ai() -> TestEnv {
    setup(None, Arc::new(StaticDrafter { text: None })).await
}

pub fn make_tenant() -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: "Acme Restaurants".to_string(),
    }
}

pub fn make_location(tenant_id: Uuid) -> Location {
    Location {
        id: Uuid::new_v4(),
        tenant_id,
        name: "Downtown".to_string(),
        address: "1 Main St".to_string(),
        city: "Austin".to_string(),
        phone: "555-0100".to_string(),
        website: "https://example.com".to_string(),
        business_hours: "9-5".to_string(),
    }
}

pub fn make_review(location_id: Uuid, rating: i32, content: &str) -> Review {
    Review {
        id: Uuid::new_v4(),
        location_id,
        rating,
        content: content.to_string(),
        author_name: "Pat".to_string(),
        platform: "google".to_string(),
        metadata: serde_json::Map::new(),
        sentiment: None,
        created_at: Utc::now(),
    }
}

pub fn make_admin(tenant_id: Uuid, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        tenant_id,
        name: "Admin".to_string(),
        email: email.to_string(),
        role: UserRole::Admin,
    }
}

/// Seed a tenant, a location, and a review, wiring the tenant directory.
pub async fn seed_review(env: &TestEnv, rating: i32, content: &str) -> (Tenant, Location, Review) {
    let tenant = make_tenant();
    let location = make_location(tenant.id);
    let review = make_review(location.id, rating, content);

    env.tenants.insert_tenant(tenant.clone()).await;
    env.tenants.link_location(location.id, tenant.id).await;
    env.tenants.link_review(review.id, tenant.id).await;
    env.locations.insert(location.clone()).await;
    env.reviews.insert(review.clone()).await;

    (tenant, location, review)
}

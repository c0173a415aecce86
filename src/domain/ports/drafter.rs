//! Port for the external response-drafting service.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::decision::ResponseTone;
use crate::domain::models::review::{Review, User};
use uuid::Uuid;

/// Parameters derived from the review and workflow AI policy.
#[derive(Debug, Clone)]
pub struct DraftParams {
    pub tone: ResponseTone,
    pub max_length: Option<u32>,
    pub brand_voice_id: Option<Uuid>,
    pub language: String,
}

/// Drafts response text for a review. Out-of-scope implementation; the
/// engine only needs text-or-nothing semantics.
#[async_trait]
pub trait ResponseDrafter: Send + Sync {
    /// Returns the drafted text, or `None` when the service produced
    /// nothing usable. Transport errors surface as `Err` and are handled by
    /// the caller's fallback path.
    async fn draft(
        &self,
        review: &Review,
        user: Option<&User>,
        params: &DraftParams,
    ) -> DomainResult<Option<String>>;
}

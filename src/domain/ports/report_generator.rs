//! Port for the external report generator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;

/// What to generate: date range, location scope, recipients.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub location_ids: Vec<Uuid>,
    pub recipient_emails: Vec<String>,
}

/// Handle to a generated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHandle {
    pub id: Uuid,
    pub status: String,
}

#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(
        &self,
        tenant_id: Uuid,
        requested_by: Uuid,
        spec: ReportSpec,
    ) -> DomainResult<ReportHandle>;
}

//! Port for notification transports.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Outbound notification transports. Each call is a two-outcome contract:
/// delivered or failed; per-recipient aggregation happens in the notify
/// action, not here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, address: &str, subject: &str, body: &str) -> DomainResult<()>;

    async fn send_slack(&self, channel: &str, message: &str) -> DomainResult<()>;

    async fn send_webhook(&self, url: &str, payload: &serde_json::Value) -> DomainResult<()>;
}

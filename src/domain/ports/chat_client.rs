//! Port for the external chat-completion API.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the external chat API, classified so callers can tell a
/// retryable outage from a configuration problem. The AI responder treats
/// both the same way: fail open.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ChatError {
    /// Whether retrying could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited | Self::ServerError { .. } | Self::Network(_)
        )
    }
}

/// One chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// External AI chat-completion client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Complete a prompt under the client's bounded timeout and return the
    /// raw text of the model's reply.
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatError>;
}

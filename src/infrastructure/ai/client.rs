//! HTTP implementation of the ChatClient port against the Anthropic
//! messages API.
//!
//! Each `complete` call is bounded by the configured timeout; status codes
//! are classified into `ChatError` variants so the responder can tell an
//! outage from a configuration problem. The API key never appears in logs
//! or error text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::models::config::AiConfig;
use crate::domain::ports::{ChatClient, ChatError, ChatRequest};

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    system: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

pub struct AnthropicChatClient {
    http_client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl AnthropicChatClient {
    /// Build a client from configuration. Returns None when no API key is
    /// configured; callers treat that as AI unavailable.
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>, ChatError> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.decision_timeout_secs))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;

        Ok(Some(Self {
            http_client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.decision_timeout_secs,
        }))
    }

    fn classify_status(status: StatusCode, body: String) -> ChatError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::InvalidApiKey,
            StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited,
            s if s.is_server_error() => ChatError::ServerError {
                status: s.as_u16(),
                body,
            },
            _ => ChatError::InvalidRequest(body),
        }
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatError> {
        let payload = MessageRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: request.user_prompt,
            }],
        };

        debug!(model = %self.model, max_tokens = request.max_tokens, "Sending chat completion request");

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout(self.timeout_secs)
                } else {
                    // reqwest error text never contains the key.
                    ChatError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            let error = Self::classify_status(status, body);
            warn!(status = status.as_u16(), error = %error, "Chat completion request failed");
            return Err(error);
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        let text: String = message
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(ChatError::MalformedResponse(
                "response contained no text blocks".to_string(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(base_url: String) -> AiConfig {
        AiConfig {
            api_key: Some("test-key".to_string()),
            base_url,
            ..AiConfig::default()
        }
    }

    #[test]
    fn test_from_config_without_key() {
        let config = AiConfig::default();
        assert!(AnthropicChatClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_empty_key_is_unavailable() {
        let config = AiConfig {
            api_key: Some(String::new()),
            ..AiConfig::default()
        };
        assert!(AnthropicChatClient::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_extracts_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_body(
                r#"{"content":[{"type":"text","text":"hello "},{"type":"text","text":"world"}]}"#,
            )
            .create_async()
            .await;

        let client = AnthropicChatClient::from_config(&config_with_key(server.url()))
            .unwrap()
            .unwrap();
        let text = client
            .complete(ChatRequest {
                system_prompt: "system".to_string(),
                user_prompt: "user".to_string(),
                max_tokens: 16,
                temperature: 0.0,
            })
            .await
            .unwrap();

        assert_eq!(text, "hello world");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_classifies_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = AnthropicChatClient::from_config(&config_with_key(server.url()))
            .unwrap()
            .unwrap();
        let err = client
            .complete(ChatRequest {
                system_prompt: String::new(),
                user_prompt: "user".to_string(),
                max_tokens: 16,
                temperature: 0.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::RateLimited));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_classifies_bad_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let client = AnthropicChatClient::from_config(&config_with_key(server.url()))
            .unwrap()
            .unwrap();
        let err = client
            .complete(ChatRequest {
                system_prompt: String::new(),
                user_prompt: "user".to_string(),
                max_tokens: 16,
                temperature: 0.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidApiKey));
        assert!(!err.is_transient());
    }
}

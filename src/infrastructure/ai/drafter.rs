//! ChatClient-backed implementation of the response drafting port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::decision::ResponseTone;
use crate::domain::models::review::{Review, User};
use crate::domain::ports::drafter::{DraftParams, ResponseDrafter};
use crate::domain::ports::{ChatClient, ChatRequest};

const DRAFT_SYSTEM_PROMPT: &str = "You draft public replies to customer reviews on behalf of \
the business. Write only the reply text, with no preamble, no quotation marks, and no signature \
beyond what is asked for. Be specific to the review's content and never promise refunds, \
compensation, or policy changes.";

const DEFAULT_DRAFT_TOKENS: u32 = 1024;

pub struct ChatDrafter {
    chat: Arc<dyn ChatClient>,
    max_tokens: u32,
}

impl ChatDrafter {
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat, max_tokens: DEFAULT_DRAFT_TOKENS }
    }
}

#[async_trait]
impl ResponseDrafter for ChatDrafter {
    async fn draft(
        &self,
        review: &Review,
        user: Option<&User>,
        params: &DraftParams,
    ) -> DomainResult<Option<String>> {
        let request = ChatRequest {
            system_prompt: DRAFT_SYSTEM_PROMPT.to_string(),
            user_prompt: build_draft_prompt(review, user, params),
            max_tokens: self.max_tokens,
            temperature: 0.7,
        };

        match self.chat.complete(request).await {
            Ok(text) => {
                let text = text.trim().to_string();
                Ok(if text.is_empty() { None } else { Some(text) })
            }
            Err(err) => {
                warn!(review_id = %review.id, error = %err, "Draft request failed");
                Err(DomainError::ExecutionFailed(err.to_string()))
            }
        }
    }
}

fn build_draft_prompt(review: &Review, user: Option<&User>, params: &DraftParams) -> String {
    let tone = match params.tone {
        ResponseTone::Professional => "professional",
        ResponseTone::Friendly => "friendly",
        ResponseTone::Apologetic => "apologetic",
        ResponseTone::Formal => "formal",
    };

    let mut prompt = format!(
        "Review (rating {}/5, platform {}) by {}:\n{}\n\nTone: {}\nLanguage: {}\n",
        review.rating, review.platform, review.author_name, review.content, tone, params.language
    );
    if let Some(max_length) = params.max_length {
        prompt.push_str(&format!("Maximum length: {max_length} characters\n"));
    }
    if let Some(user) = user {
        prompt.push_str(&format!("Sign off as {}\n", user.name));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_build_draft_prompt_includes_constraints() {
        let review = Review {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            rating: 1,
            content: "Cold food".to_string(),
            author_name: "Sam".to_string(),
            platform: "yelp".to_string(),
            metadata: serde_json::Map::new(),
            sentiment: None,
            created_at: Utc::now(),
        };
        let params = DraftParams {
            tone: ResponseTone::Apologetic,
            max_length: Some(300),
            brand_voice_id: None,
            language: "en".to_string(),
        };

        let prompt = build_draft_prompt(&review, None, &params);
        assert!(prompt.contains("rating 1/5"));
        assert!(prompt.contains("Tone: apologetic"));
        assert!(prompt.contains("Maximum length: 300"));
    }
}

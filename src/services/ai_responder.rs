//! AI decision & response service.
//!
//! Decides whether to respond to a review, drafts a response through the
//! external drafting service, and applies the deterministic safety and
//! auto-approval policies. Every external failure degrades to an explicit
//! fallback value; this service never lets an AI outage silently drop a
//! review.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::decision::{AiDecision, ResponseTone};
use crate::domain::models::review::{Location, ResponseDraft, ResponseStatus, Review, User};
use crate::domain::models::workflow::{SafetyLevel, Workflow};
use crate::domain::ports::chat_client::{ChatClient, ChatRequest};
use crate::domain::ports::drafter::{DraftParams, ResponseDrafter};
use crate::domain::ports::stores::ResponseStore;
use crate::services::safety;

/// Confidence below which a high-safety workflow refuses to auto-respond.
const HIGH_SAFETY_MIN_CONFIDENCE: f64 = 0.8;

/// Result of a full decide-draft-gate pass for one review.
#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub decision: AiDecision,
    /// The draft that was created or updated, if any.
    pub response: Option<ResponseDraft>,
    pub auto_approved: bool,
    pub requires_review: bool,
    /// Why the response was held back or skipped.
    pub reason: Option<String>,
}

impl ResponseOutcome {
    fn refused(decision: AiDecision) -> Self {
        let reason = Some(decision.reason.clone());
        Self { decision, response: None, auto_approved: false, requires_review: false, reason }
    }
}

pub struct AiResponder {
    /// Absent when no API credential is configured; decisions then fail
    /// open toward manual drafts.
    chat: Option<Arc<dyn ChatClient>>,
    drafter: Arc<dyn ResponseDrafter>,
    responses: Arc<dyn ResponseStore>,
    max_decision_tokens: u32,
}

impl AiResponder {
    pub fn new(
        chat: Option<Arc<dyn ChatClient>>,
        drafter: Arc<dyn ResponseDrafter>,
        responses: Arc<dyn ResponseStore>,
    ) -> Self {
        Self { chat, drafter, responses, max_decision_tokens: 512 }
    }

    /// Decide whether the engine should auto-respond to a review.
    ///
    /// Never returns an error: AI unavailability fails open toward creating
    /// a manual draft, and unparseable model output refuses conservatively.
    pub async fn should_auto_respond(
        &self,
        review: &Review,
        location: Option<&Location>,
        workflow: &Workflow,
    ) -> AiDecision {
        let Some(chat) = &self.chat else {
            return AiDecision::fail_open("ai_unavailable");
        };

        let request = ChatRequest {
            system_prompt: DECISION_SYSTEM_PROMPT.to_string(),
            user_prompt: build_decision_prompt(review, location, workflow),
            max_tokens: self.max_decision_tokens,
            temperature: 0.0,
        };

        // Overrides apply only to decisions the model actually made. A
        // fail-open decision must reach the fallback-draft path untouched,
        // or an outage under a strict safety level turns into silent
        // inaction.
        match chat.complete(request).await {
            Ok(text) => apply_safety_overrides(parse_decision_text(&text), workflow),
            Err(err) => {
                warn!(
                    review_id = %review.id,
                    workflow_id = %workflow.id,
                    error = %err,
                    transient = err.is_transient(),
                    "AI decision call failed, failing open"
                );
                AiDecision::fail_open("ai_error")
            }
        }
    }

    /// Full pipeline: decide, draft, safety-check, auto-approve.
    ///
    /// Storage errors propagate; the ai_response action converts them into
    /// the draft-with-rejection-reason fallback at its boundary.
    pub async fn generate_response(
        &self,
        review: &Review,
        user: Option<&User>,
        location: Option<&Location>,
        workflow: &Workflow,
    ) -> DomainResult<ResponseOutcome> {
        let decision = self.should_auto_respond(review, location, workflow).await;
        if !decision.should_respond {
            info!(
                review_id = %review.id,
                reason = %decision.reason,
                "AI decision declined to respond"
            );
            return Ok(ResponseOutcome::refused(decision));
        }

        let params = derive_params(review, workflow);

        let drafted = match self.drafter.draft(review, user, &params).await {
            Ok(text) => text,
            Err(err) => {
                warn!(review_id = %review.id, error = %err, "Response drafting failed");
                None
            }
        };

        let Some(content) = drafted.filter(|c| !c.trim().is_empty()) else {
            // A human always gets something to act on, even on total AI
            // failure.
            let response = self
                .fallback_draft(review, &params, "AI generation failed or returned no content")
                .await?;
            return Ok(ResponseOutcome {
                decision,
                response: Some(response),
                auto_approved: false,
                requires_review: true,
                reason: Some("generation_failed".to_string()),
            });
        };

        let mut response = self.responses.find_or_create(review.id).await?;
        response.content = content.clone();
        response.ai_generated = true;
        response.tone = params.tone;
        response.language = params.language.clone();

        let verdict = safety::check_response(review, &content);
        if !verdict.is_safe() {
            let reason = verdict.reason().unwrap_or("unsafe").to_string();
            response.rejection_reason = Some(reason.clone());
            response.status = ResponseStatus::Draft;
            self.responses.update(&response).await?;
            info!(review_id = %review.id, reason = %reason, "Generated response failed safety check");
            return Ok(ResponseOutcome {
                decision,
                response: Some(response),
                auto_approved: false,
                requires_review: true,
                reason: Some(reason),
            });
        }

        let auto_approved = !decision.requires_approval
            && safety::auto_approval_eligible(&workflow.ai.auto_approve, &decision, review);
        if auto_approved {
            response.status = ResponseStatus::Approved;
        }
        self.responses.update(&response).await?;

        Ok(ResponseOutcome {
            decision,
            response: Some(response),
            auto_approved,
            requires_review: !auto_approved,
            reason: None,
        })
    }

    /// Create an empty, human-actionable draft recording why generation
    /// failed.
    pub async fn fallback_draft(
        &self,
        review: &Review,
        params: &DraftParams,
        reason: &str,
    ) -> DomainResult<ResponseDraft> {
        let mut response = self.responses.find_or_create(review.id).await?;
        response.content = String::new();
        response.ai_generated = false;
        response.rejection_reason = Some(reason.to_string());
        response.status = ResponseStatus::Draft;
        response.tone = params.tone;
        self.responses.update(&response).await?;
        Ok(response)
    }
}

const DECISION_SYSTEM_PROMPT: &str = "You are a review-response triage assistant. \
Given a customer review, decide whether an automated response should be drafted. \
Reply with a single JSON object with keys: should_respond (bool), confidence (0..1), \
reason (string), suggested_tone (professional|friendly|apologetic|formal), \
urgency (low|medium|high), complexity (simple|moderate|complex), risk_factors (array of strings). \
No prose outside the JSON.";

fn build_decision_prompt(
    review: &Review,
    location: Option<&Location>,
    workflow: &Workflow,
) -> String {
    let mut prompt = format!(
        "Review (rating {}/5, platform {}):\n{}\n",
        review.rating, review.platform, review.content
    );
    if let Some(location) = location {
        prompt.push_str(&format!("Location: {}\n", location.name));
    }
    if let Some(sentiment) = &review.sentiment {
        let emotions: Vec<String> = sentiment
            .top_emotions(3)
            .into_iter()
            .map(|(name, weight)| format!("{name} ({weight:.2})"))
            .collect();
        prompt.push_str(&format!(
            "Sentiment: {} (score {:.2}), top emotions: {}\n",
            sentiment.label,
            sentiment.score,
            emotions.join(", ")
        ));
    }
    let safety = match workflow.ai.safety_level {
        SafetyLevel::Low => "low",
        SafetyLevel::Standard => "standard",
        SafetyLevel::High => "high",
    };
    prompt.push_str(&format!("Safety level: {safety}\n"));
    prompt
}

/// Parse the model's reply into a decision, tolerating a fenced code block
/// wrapper. Unparseable output refuses conservatively.
pub fn parse_decision_text(text: &str) -> AiDecision {
    let candidate = text.trim();
    if let Ok(decision) = serde_json::from_str::<AiDecision>(candidate) {
        return clamp(decision);
    }

    // Extract the first {...} block (handles ```json fences and prose).
    if let (Some(start), Some(end)) = (candidate.find('{'), candidate.rfind('}')) {
        if start < end {
            if let Ok(decision) = serde_json::from_str::<AiDecision>(&candidate[start..=end]) {
                return clamp(decision);
            }
        }
    }

    AiDecision::refuse_unparseable()
}

fn clamp(mut decision: AiDecision) -> AiDecision {
    decision.confidence = decision.confidence.clamp(0.0, 1.0);
    decision
}

/// Safety overrides applied after parsing, regardless of the model's own
/// verdict.
pub fn apply_safety_overrides(mut decision: AiDecision, workflow: &Workflow) -> AiDecision {
    if workflow.ai.safety_level == SafetyLevel::High
        && decision.confidence < HIGH_SAFETY_MIN_CONFIDENCE
    {
        decision.should_respond = false;
        decision.requires_approval = true;
    }
    if workflow.ai.require_approval && decision.should_respond {
        decision.requires_approval = true;
    }
    decision
}

/// Tone defaults derive from the rating; the workflow AI policy overrides.
pub fn derive_params(review: &Review, workflow: &Workflow) -> DraftParams {
    let derived_tone = if review.rating <= 2 {
        ResponseTone::Apologetic
    } else if review.rating >= 4 {
        ResponseTone::Friendly
    } else {
        ResponseTone::Professional
    };
    DraftParams {
        tone: workflow.ai.default_tone.unwrap_or(derived_tone),
        max_length: workflow.ai.max_length,
        brand_voice_id: workflow.ai.brand_voice_id,
        language: "en".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::decision::Complexity;
    use crate::domain::models::workflow::{AiPolicy, TriggerType};
    use chrono::Utc;
    use uuid::Uuid;

    fn review(rating: i32) -> Review {
        Review {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            rating,
            content: "content".to_string(),
            author_name: "Tester".to_string(),
            platform: "google".to_string(),
            metadata: serde_json::Map::new(),
            sentiment: None,
            created_at: Utc::now(),
        }
    }

    fn workflow_with_ai(ai: AiPolicy) -> Workflow {
        let mut wf = Workflow::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Test",
            TriggerType::ReviewReceived,
        );
        wf.ai = ai;
        wf
    }

    #[test]
    fn test_parse_plain_json() {
        let decision = parse_decision_text(
            r#"{"should_respond": true, "confidence": 0.92, "complexity": "simple"}"#,
        );
        assert!(decision.should_respond);
        assert!((decision.confidence - 0.92).abs() < f64::EPSILON);
        assert_eq!(decision.complexity, Complexity::Simple);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"should_respond\": true, \"confidence\": 0.7}\n```";
        let decision = parse_decision_text(text);
        assert!(decision.should_respond);
        assert!((decision.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let text = "Here is my analysis: {\"should_respond\": false, \"reason\": \"spam\"} hope that helps";
        let decision = parse_decision_text(text);
        assert!(!decision.should_respond);
        assert_eq!(decision.reason, "spam");
    }

    #[test]
    fn test_parse_garbage_refuses() {
        let decision = parse_decision_text("I cannot answer that.");
        assert!(!decision.should_respond);
        assert_eq!(decision.complexity, Complexity::Complex);
        assert_eq!(decision.risk_factors, vec!["parsing_error".to_string()]);
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let decision = parse_decision_text(r#"{"should_respond": true, "confidence": 3.5}"#);
        assert!((decision.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_high_safety_low_confidence_override() {
        let wf = workflow_with_ai(AiPolicy {
            enabled: true,
            safety_level: SafetyLevel::High,
            ..Default::default()
        });
        let decision = AiDecision {
            should_respond: true,
            confidence: 0.6,
            ..AiDecision::default()
        };
        let decision = apply_safety_overrides(decision, &wf);
        assert!(!decision.should_respond);
        assert!(decision.requires_approval);
    }

    #[test]
    fn test_high_safety_high_confidence_passes() {
        let wf = workflow_with_ai(AiPolicy {
            enabled: true,
            safety_level: SafetyLevel::High,
            ..Default::default()
        });
        let decision = AiDecision {
            should_respond: true,
            confidence: 0.9,
            ..AiDecision::default()
        };
        let decision = apply_safety_overrides(decision, &wf);
        assert!(decision.should_respond);
    }

    #[test]
    fn test_require_approval_override() {
        let wf = workflow_with_ai(AiPolicy {
            enabled: true,
            require_approval: true,
            ..Default::default()
        });
        let decision = AiDecision {
            should_respond: true,
            confidence: 0.95,
            ..AiDecision::default()
        };
        let decision = apply_safety_overrides(decision, &wf);
        assert!(decision.should_respond);
        assert!(decision.requires_approval);
    }

    #[test]
    fn test_derive_params_tone_by_rating() {
        let wf = workflow_with_ai(AiPolicy::default());
        assert_eq!(derive_params(&review(1), &wf).tone, ResponseTone::Apologetic);
        assert_eq!(derive_params(&review(2), &wf).tone, ResponseTone::Apologetic);
        assert_eq!(derive_params(&review(3), &wf).tone, ResponseTone::Professional);
        assert_eq!(derive_params(&review(4), &wf).tone, ResponseTone::Friendly);
        assert_eq!(derive_params(&review(5), &wf).tone, ResponseTone::Friendly);
    }

    #[test]
    fn test_derive_params_policy_override_wins() {
        let wf = workflow_with_ai(AiPolicy {
            default_tone: Some(ResponseTone::Formal),
            max_length: Some(400),
            ..Default::default()
        });
        let params = derive_params(&review(1), &wf);
        assert_eq!(params.tone, ResponseTone::Formal);
        assert_eq!(params.max_length, Some(400));
    }
}

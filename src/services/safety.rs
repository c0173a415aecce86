//! Deterministic safety gate and auto-approval policy for AI-generated
//! response content. Non-AI heuristics only; applied after generation and
//! before any approval.

use crate::domain::models::decision::{AiDecision, Complexity};
use crate::domain::models::review::Review;
use crate::domain::models::workflow::AutoApprovePolicy;

/// Legal/medical/financial terms that always require human review.
const RISK_KEYWORDS: &[&str] = &[
    "lawsuit",
    "sue",
    "legal",
    "attorney",
    "lawyer",
    "court",
    "discrimination",
    "harassment",
    "refund",
    "compensation",
    "chargeback",
    "fraud",
    "medical",
    "injury",
    "allergic",
    "poisoning",
    "health department",
];

/// Minimum response length; anything shorter reads as generic boilerplate.
const MIN_RESPONSE_LEN: usize = 30;

/// Result of the deterministic safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    Safe,
    Unsafe { reason: String },
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Safe => None,
            Self::Unsafe { reason } => Some(reason),
        }
    }
}

/// Check a generated response against the review it answers.
pub fn check_response(review: &Review, response_content: &str) -> SafetyVerdict {
    let review_text = review.content.to_lowercase();
    let response_text = response_content.to_lowercase();

    for keyword in RISK_KEYWORDS {
        if review_text.contains(keyword) || response_text.contains(keyword) {
            return SafetyVerdict::Unsafe {
                reason: format!("Contains risk keyword: {keyword}"),
            };
        }
    }

    if response_content.len() < MIN_RESPONSE_LEN {
        return SafetyVerdict::Unsafe {
            reason: "Response too short, reads as generic".to_string(),
        };
    }

    if review.rating <= 2 && !response_text.contains("sorry") && !response_text.contains("apologize")
    {
        return SafetyVerdict::Unsafe {
            reason: "Negative review response missing an apology".to_string(),
        };
    }

    SafetyVerdict::Safe
}

/// Whether a safe response may skip manual approval. Every condition must
/// hold; any single failure denies.
pub fn auto_approval_eligible(
    policy: &AutoApprovePolicy,
    decision: &AiDecision,
    review: &Review,
) -> bool {
    policy.enabled
        && decision.confidence >= policy.min_confidence
        && review.rating <= policy.max_rating
        && decision.complexity == Complexity::Simple
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn review(rating: i32, content: &str) -> Review {
        Review {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            rating,
            content: content.to_string(),
            author_name: "Tester".to_string(),
            platform: "google".to_string(),
            metadata: serde_json::Map::new(),
            sentiment: None,
            created_at: Utc::now(),
        }
    }

    const SAFE_APOLOGY: &str =
        "We are so sorry to hear about your experience and will make it right.";

    #[test]
    fn test_short_response_is_unsafe() {
        let verdict = check_response(&review(4, "Great!"), "Thanks!");
        assert!(!verdict.is_safe());
    }

    #[test]
    fn test_risk_keyword_in_review_is_unsafe() {
        let verdict = check_response(&review(1, "terrible, will sue"), SAFE_APOLOGY);
        assert!(!verdict.is_safe());
        assert!(verdict.reason().unwrap().contains("sue"));
    }

    #[test]
    fn test_risk_keyword_in_response_is_unsafe() {
        let verdict = check_response(
            &review(4, "Good food"),
            "Thank you! We would be happy to offer you a refund for the trouble.",
        );
        assert!(!verdict.is_safe());
    }

    #[test]
    fn test_negative_review_requires_apology() {
        let no_apology = "Thank you for the feedback, we will look into this promptly.";
        assert!(!check_response(&review(1, "Bad service"), no_apology).is_safe());
        assert!(!check_response(&review(2, "Bad service"), no_apology).is_safe());
        assert!(check_response(&review(2, "Bad service"), SAFE_APOLOGY).is_safe());
        // Rating 3 does not require an apology.
        assert!(check_response(&review(3, "Okay service"), no_apology).is_safe());
    }

    #[test]
    fn test_case_insensitive_keyword_match() {
        let verdict = check_response(&review(1, "I will contact my LAWYER"), SAFE_APOLOGY);
        assert!(!verdict.is_safe());
    }

    fn eligible_inputs() -> (AutoApprovePolicy, AiDecision, Review) {
        let policy = AutoApprovePolicy { enabled: true, min_confidence: 0.8, max_rating: 3 };
        let decision = AiDecision {
            confidence: 0.9,
            complexity: Complexity::Simple,
            ..AiDecision::default()
        };
        (policy, decision, review(2, "Meh"))
    }

    #[test]
    fn test_auto_approval_all_conditions_met() {
        let (policy, decision, rev) = eligible_inputs();
        assert!(auto_approval_eligible(&policy, &decision, &rev));
    }

    #[test]
    fn test_auto_approval_single_flip_denies() {
        // Disabled policy
        let (mut policy, decision, rev) = eligible_inputs();
        policy.enabled = false;
        assert!(!auto_approval_eligible(&policy, &decision, &rev));

        // Confidence below minimum
        let (policy, mut decision, rev) = eligible_inputs();
        decision.confidence = 0.7;
        assert!(!auto_approval_eligible(&policy, &decision, &rev));

        // Rating above maximum
        let (policy, decision, _) = eligible_inputs();
        assert!(!auto_approval_eligible(&policy, &decision, &review(4, "Meh")));

        // Complexity not simple
        let (policy, mut decision, rev) = eligible_inputs();
        decision.complexity = Complexity::Moderate;
        assert!(!auto_approval_eligible(&policy, &decision, &rev));
    }

    #[test]
    fn test_auto_approval_boundary_values() {
        let (policy, mut decision, rev) = eligible_inputs();
        decision.confidence = 0.8;
        assert!(auto_approval_eligible(&policy, &decision, &rev));
        assert!(auto_approval_eligible(&policy, &decision, &review(3, "Meh")));
    }
}

//! AI decision value produced per ai_response invocation.
//!
//! Not persisted as its own entity; it feeds the safety overrides and the
//! auto-approval gate, and is embedded in the action's result payload.

use serde::{Deserialize, Serialize};

/// Voice of a drafted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTone {
    Professional,
    Friendly,
    Apologetic,
    Formal,
}

impl Default for ResponseTone {
    fn default() -> Self {
        Self::Professional
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Default for Complexity {
    fn default() -> Self {
        Self::Moderate
    }
}

/// The AI service's structured verdict on whether/how to respond to a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    #[serde(default)]
    pub should_respond: bool,
    /// 0.0..=1.0
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub suggested_tone: ResponseTone,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    /// Set by safety overrides, not by the model.
    #[serde(default)]
    pub requires_approval: bool,
}

fn default_confidence() -> f64 {
    0.5
}

impl Default for AiDecision {
    fn default() -> Self {
        Self {
            should_respond: false,
            confidence: default_confidence(),
            reason: String::new(),
            suggested_tone: ResponseTone::default(),
            urgency: Urgency::default(),
            complexity: Complexity::default(),
            risk_factors: Vec::new(),
            requires_approval: false,
        }
    }
}

impl AiDecision {
    /// Conservative default used when the external AI is unavailable.
    ///
    /// Fails open toward manual-draft creation, never toward silent
    /// inaction: a human still gets a draft to act on.
    pub fn fail_open(risk_factor: impl Into<String>) -> Self {
        Self {
            should_respond: true,
            confidence: 0.5,
            reason: "AI decision unavailable, creating draft for manual review".to_string(),
            risk_factors: vec![risk_factor.into()],
            requires_approval: true,
            ..Self::default()
        }
    }

    /// Hard refusal used when the model's output cannot be parsed.
    pub fn refuse_unparseable() -> Self {
        Self {
            should_respond: false,
            complexity: Complexity::Complex,
            reason: "Model output could not be parsed".to_string(),
            risk_factors: vec!["parsing_error".to_string()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_open_defaults() {
        let decision = AiDecision::fail_open("ai_unavailable");
        assert!(decision.should_respond);
        assert!(decision.requires_approval);
        assert!((decision.confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(decision.risk_factors, vec!["ai_unavailable".to_string()]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let decision: AiDecision =
            serde_json::from_str(r#"{"should_respond": true, "confidence": 0.9}"#).unwrap();
        assert!(decision.should_respond);
        assert_eq!(decision.suggested_tone, ResponseTone::Professional);
        assert_eq!(decision.urgency, Urgency::Medium);
        assert_eq!(decision.complexity, Complexity::Moderate);
        assert!(decision.risk_factors.is_empty());
    }
}

//! Trigger matching: does an event make a workflow eligible?
//!
//! Pure and side-effect-free. The review-category triggers all fan in on
//! review events: one incoming review is checked against review_received,
//! negative_review, positive_review, and negative_sentiment workflows
//! alike, and each workflow's configured thresholds decide whether it
//! fires. Scheduled and manual triggers match only their own events.

use crate::domain::models::event::AutomationEvent;
use crate::domain::models::workflow::{TriggerConfig, TriggerType};

/// Whether a workflow's trigger matches an incoming event.
pub fn matches(trigger: TriggerType, config: &TriggerConfig, event: &AutomationEvent) -> bool {
    if !(trigger.is_review_category() && event.trigger.is_review_category()) {
        return trigger == event.trigger;
    }

    if !platform_allowed(config, event) {
        return false;
    }

    match trigger {
        TriggerType::NegativeReview => {
            event_rating(event).is_some_and(|r| r <= i64::from(config.negative_rating_threshold()))
        }
        TriggerType::PositiveReview => {
            event_rating(event).is_some_and(|r| r >= i64::from(config.positive_rating_threshold()))
        }
        TriggerType::NegativeSentiment => {
            event_sentiment_score(event).is_some_and(|s| s <= config.negative_sentiment_threshold())
        }
        // review_received; scheduled/manual returned above.
        _ => true,
    }
}

/// The trigger categories to select workflows from when dispatching an
/// event. A review event fans out across every review category.
pub fn selection_triggers(event_trigger: TriggerType) -> Vec<TriggerType> {
    if event_trigger.is_review_category() {
        vec![
            TriggerType::ReviewReceived,
            TriggerType::NegativeReview,
            TriggerType::PositiveReview,
            TriggerType::NegativeSentiment,
        ]
    } else {
        vec![event_trigger]
    }
}

fn platform_allowed(config: &TriggerConfig, event: &AutomationEvent) -> bool {
    if config.platforms.is_empty() {
        return true;
    }
    event
        .data
        .get("platform")
        .and_then(|v| v.as_str())
        .is_some_and(|p| config.platforms.iter().any(|allowed| allowed == p))
}

fn event_rating(event: &AutomationEvent) -> Option<i64> {
    event
        .data
        .get("rating")
        .or_else(|| event.data.get("review").and_then(|r| r.get("rating")))
        .and_then(serde_json::Value::as_i64)
}

fn event_sentiment_score(event: &AutomationEvent) -> Option<f64> {
    event
        .data
        .get("sentiment_score")
        .or_else(|| {
            event
                .data
                .get("review")
                .and_then(|r| r.get("sentiment"))
                .and_then(|s| s.get("score"))
        })
        .and_then(serde_json::Value::as_f64)
}

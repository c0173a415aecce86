//! Consumed domain entities: reviews, locations, tenants, users, and the
//! draft responses the engine produces for reviews.
//!
//! These are the minimal shapes the automation core reads and mutates
//! through its store ports; full persistence lives outside the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::decision::ResponseTone;

/// Sentiment summary computed upstream and consumed as input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Dominant sentiment label, e.g. "negative".
    pub label: String,
    /// 0.0 (most negative) ..= 1.0 (most positive).
    pub score: f64,
    /// Emotion name -> weight.
    #[serde(default)]
    pub emotions: std::collections::HashMap<String, f64>,
}

impl SentimentSummary {
    /// Top emotions ordered by descending weight.
    pub fn top_emotions(&self, n: usize) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> =
            self.emotions.iter().map(|(k, v)| (k.clone(), *v)).collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs.truncate(n);
        pairs
    }
}

/// A customer review the engine acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub location_id: Uuid,
    /// 1..=5 star rating.
    pub rating: i32,
    pub content: String,
    pub author_name: String,
    /// Source platform, e.g. "google", "facebook".
    pub platform: String,
    /// Free-form metadata; the engine maintains a `tags` array inside it.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub sentiment: Option<SentimentSummary>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Current tag set from metadata (missing or malformed -> empty).
    pub fn tags(&self) -> Vec<String> {
        self.metadata
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merge new tags into the existing set, deduplicated and order-stable.
    /// Returns the tags that were actually added.
    pub fn merge_tags(&mut self, new_tags: &[String]) -> Vec<String> {
        let mut tags = self.tags();
        let mut added = Vec::new();
        for tag in new_tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
                added.push(tag.clone());
            }
        }
        self.metadata.insert(
            "tags".to_string(),
            serde_json::Value::Array(tags.into_iter().map(serde_json::Value::String).collect()),
        );
        added
    }
}

/// A business location owning reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub business_hours: String,
}

impl Location {
    /// Fields the update_listing action may write.
    pub const WRITABLE_FIELDS: &'static [&'static str] =
        &["name", "address", "city", "phone", "website", "business_hours"];

    /// Apply an allow-listed field diff. Unknown or non-writable fields are
    /// skipped. Returns the names of the fields that were updated.
    pub fn apply_diff(&mut self, fields: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
        let mut updated = Vec::new();
        for (key, value) in fields {
            let Some(value) = value.as_str() else { continue };
            let slot = match key.as_str() {
                "name" => &mut self.name,
                "address" => &mut self.address,
                "city" => &mut self.city,
                "phone" => &mut self.phone,
                "website" => &mut self.website,
                "business_hours" => &mut self.business_hours,
                _ => continue,
            };
            *slot = value.to_string();
            updated.push(key.clone());
        }
        updated
    }
}

/// The tenant (account) owning workflows and locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Member,
}

/// A tenant operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Lifecycle of a draft response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Draft,
    Approved,
    Published,
    Rejected,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

/// The artifact an ai_response action produces or updates for a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDraft {
    pub id: Uuid,
    pub review_id: Uuid,
    pub content: String,
    pub status: ResponseStatus,
    pub ai_generated: bool,
    /// Why the draft was held back (safety reason, generation failure).
    pub rejection_reason: Option<String>,
    pub tone: ResponseTone,
    pub language: String,
    /// User responsible for this response, set by the assign_user action.
    pub assigned_user: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResponseDraft {
    pub fn new(review_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            review_id,
            content: String::new(),
            status: ResponseStatus::Draft,
            ai_generated: false,
            rejection_reason: None,
            tone: ResponseTone::default(),
            language: "en".to_string(),
            assigned_user: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_review() -> Review {
        Review {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            rating: 3,
            content: "Decent experience".to_string(),
            author_name: "A. Customer".to_string(),
            platform: "google".to_string(),
            metadata: serde_json::Map::new(),
            sentiment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_tags_dedupes_and_preserves_order() {
        let mut review = sample_review();
        let added = review.merge_tags(&["vip".to_string(), "follow_up".to_string()]);
        assert_eq!(added, vec!["vip".to_string(), "follow_up".to_string()]);

        let added = review.merge_tags(&["vip".to_string(), "urgent".to_string()]);
        assert_eq!(added, vec!["urgent".to_string()]);
        assert_eq!(review.tags(), vec!["vip", "follow_up", "urgent"]);
    }

    #[test]
    fn test_location_diff_skips_unknown_fields() {
        let mut location = Location {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Old Name".to_string(),
            address: String::new(),
            city: String::new(),
            phone: String::new(),
            website: String::new(),
            business_hours: String::new(),
        };

        let mut fields = serde_json::Map::new();
        fields.insert("name".to_string(), serde_json::json!("New Name"));
        fields.insert("id".to_string(), serde_json::json!("not-allowed"));
        fields.insert("bogus".to_string(), serde_json::json!("skipped"));

        let updated = location.apply_diff(&fields);
        assert_eq!(updated, vec!["name".to_string()]);
        assert_eq!(location.name, "New Name");
    }

    #[test]
    fn test_top_emotions_ordering() {
        let mut sentiment = SentimentSummary {
            label: "negative".to_string(),
            score: 0.2,
            emotions: std::collections::HashMap::new(),
        };
        sentiment.emotions.insert("anger".to_string(), 0.7);
        sentiment.emotions.insert("sadness".to_string(), 0.2);
        sentiment.emotions.insert("disgust".to_string(), 0.5);
        sentiment.emotions.insert("fear".to_string(), 0.1);

        let top = sentiment.top_emotions(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, "anger");
        assert_eq!(top[1].0, "disgust");
    }
}

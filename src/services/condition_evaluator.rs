//! Condition evaluation against an event's data context.
//!
//! Conditions are ANDed; an empty list is vacuously true. A condition whose
//! field is absent from the context evaluates to false rather than raising,
//! so a rule referencing missing data simply does not match.

use serde_json::Value;

use crate::domain::models::workflow::{Condition, ConditionOperator};

/// Evaluate all conditions against the event data.
pub fn matches_conditions(conditions: &[Condition], data: &Value) -> bool {
    conditions.iter().all(|c| matches_condition(c, data))
}

fn matches_condition(condition: &Condition, data: &Value) -> bool {
    let Some(actual) = lookup_path(data, &condition.field) else {
        return false;
    };

    match condition.operator {
        ConditionOperator::Equals => json_eq(actual, &condition.value),
        ConditionOperator::NotEquals => !json_eq(actual, &condition.value),
        ConditionOperator::In => condition
            .value
            .as_array()
            .is_some_and(|arr| arr.iter().any(|v| json_eq(actual, v))),
        ConditionOperator::NotIn => condition
            .value
            .as_array()
            .is_some_and(|arr| !arr.iter().any(|v| json_eq(actual, v))),
        ConditionOperator::GreaterThan => match (actual.as_f64(), condition.value.as_f64()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::LessThan => match (actual.as_f64(), condition.value.as_f64()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::Contains => match (actual, &condition.value) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::Array(items), needle) => items.iter().any(|v| json_eq(v, needle)),
            _ => false,
        },
    }
}

/// Dot-addressable lookup into the event data, e.g. `review.rating`.
fn lookup_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Numeric-tolerant equality: 2 == 2.0.
fn json_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return (x - y).abs() < f64::EPSILON;
    }
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cond(field: &str, operator: ConditionOperator, value: Value) -> Condition {
        Condition { field: field.to_string(), operator, value }
    }

    #[test]
    fn test_empty_conditions_vacuously_true() {
        assert!(matches_conditions(&[], &json!({})));
    }

    #[test]
    fn test_missing_field_is_false_not_error() {
        let c = cond("review.nonexistent", ConditionOperator::Equals, json!(1));
        assert!(!matches_conditions(&[c], &json!({ "review": { "rating": 1 } })));
    }

    #[test]
    fn test_equals_and_not_equals() {
        let data = json!({ "platform": "google", "rating": 2 });
        assert!(matches_conditions(
            &[cond("platform", ConditionOperator::Equals, json!("google"))],
            &data
        ));
        assert!(matches_conditions(
            &[cond("platform", ConditionOperator::NotEquals, json!("yelp"))],
            &data
        ));
        // Integer vs float equality
        assert!(matches_conditions(
            &[cond("rating", ConditionOperator::Equals, json!(2.0))],
            &data
        ));
    }

    #[test]
    fn test_in_and_not_in() {
        let data = json!({ "platform": "google" });
        assert!(matches_conditions(
            &[cond("platform", ConditionOperator::In, json!(["google", "facebook"]))],
            &data
        ));
        assert!(!matches_conditions(
            &[cond("platform", ConditionOperator::NotIn, json!(["google"]))],
            &data
        ));
    }

    #[test]
    fn test_numeric_comparisons() {
        let data = json!({ "review": { "rating": 3 } });
        assert!(matches_conditions(
            &[cond("review.rating", ConditionOperator::GreaterThan, json!(2))],
            &data
        ));
        assert!(matches_conditions(
            &[cond("review.rating", ConditionOperator::LessThan, json!(4))],
            &data
        ));
        assert!(!matches_conditions(
            &[cond("review.rating", ConditionOperator::LessThan, json!(3))],
            &data
        ));
    }

    #[test]
    fn test_contains_string_and_array() {
        let data = json!({ "content": "terrible service", "tags": ["vip", "urgent"] });
        assert!(matches_conditions(
            &[cond("content", ConditionOperator::Contains, json!("terrible"))],
            &data
        ));
        assert!(matches_conditions(
            &[cond("tags", ConditionOperator::Contains, json!("vip"))],
            &data
        ));
        assert!(!matches_conditions(
            &[cond("tags", ConditionOperator::Contains, json!("spam"))],
            &data
        ));
    }

    #[test]
    fn test_conditions_are_anded() {
        let data = json!({ "rating": 1, "platform": "google" });
        let all = [
            cond("rating", ConditionOperator::LessThan, json!(3)),
            cond("platform", ConditionOperator::Equals, json!("google")),
        ];
        assert!(matches_conditions(&all, &data));

        let with_failing = [
            cond("rating", ConditionOperator::LessThan, json!(3)),
            cond("platform", ConditionOperator::Equals, json!("yelp")),
        ];
        assert!(!matches_conditions(&with_failing, &data));
    }
}

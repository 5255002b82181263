use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One classified value of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityValue {
    #[serde(deserialize_with = "value_as_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Character offsets into the utterance, for word-level entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl EntityValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            confidence: None,
            start: None,
            end: None,
        }
    }
}

/// Entities keyed by name (`intent`, `sentiment`, `option`, `greetings`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySet(HashMap<String, Vec<EntityValue>>);

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.0
            .entry(name.into())
            .or_default()
            .extend(values.iter().map(|v| EntityValue::new(*v)));
        self
    }

    /// Whether the entity was detected at all.
    pub fn contains(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_empty())
    }

    /// All values of an entity, in service order. Empty when absent.
    pub fn values(&self, name: &str) -> Vec<String> {
        self.0
            .get(name)
            .map(|vals| vals.iter().map(|v| v.value.clone()).collect())
            .unwrap_or_default()
    }

    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.0.get(name)?.first().map(|v| v.value.as_str())
    }

    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.0
            .get(name)
            .is_some_and(|vals| vals.iter().any(|v| v.value == value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// The service occasionally returns numbers or booleans as entity values.
fn value_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_entities() {
        let raw = serde_json::json!({
            "intent": [{ "confidence": 0.97, "value": "or_question" }],
            "option": [
                { "value": "Pizza", "start": 0, "end": 5 },
                { "value": "sushi", "start": 9, "end": 14 }
            ],
            "number": [{ "value": 3 }]
        });
        let set: EntitySet = serde_json::from_value(raw).unwrap();

        assert_eq!(set.first_value("intent"), Some("or_question"));
        assert_eq!(set.values("option"), vec!["Pizza", "sushi"]);
        assert_eq!(set.values("number"), vec!["3"]);
        assert!(set.has_value("intent", "or_question"));
    }

    #[test]
    fn absent_entity_yields_empty_values() {
        let set = EntitySet::new().with("greetings", &["true"]);
        assert!(set.values("intent").is_empty());
        assert_eq!(set.first_value("intent"), None);
        assert!(!set.contains("intent"));
        assert!(set.contains("greetings"));
    }

    #[test]
    fn empty_value_list_counts_as_absent() {
        let set: EntitySet = serde_json::from_value(serde_json::json!({ "intent": [] })).unwrap();
        assert!(!set.contains("intent"));
        assert!(set.is_empty());
    }
}

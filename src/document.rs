use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The decrypted application payload.
///
/// The vault treats this as opaque beyond one rule: a valid document always
/// carries a top-level `habits` collection. That requirement doubles as the
/// decryption-success oracle — a blob opened under the wrong key either fails
/// authentication outright or fails this shape check, and is never trusted.
///
/// Payload sections the vault does not model (exercises, workout logs, ...)
/// are captured by the flattened `extra` map and round-trip untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Document {
    habits: Vec<Habit>,
    #[serde(default)]
    completions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    settings: BTreeMap<String, Value>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Habit {
    id: String,
    name: String,
    created: String,
}

impl Habit {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            created: Utc::now().to_rfc3339(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created(&self) -> &str {
        &self.created
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn add_habit(&mut self, habit: Habit) {
        self.habits.push(habit);
    }

    /// Records a completion date (ISO `YYYY-MM-DD`) for a habit id.
    pub fn record_completion(&mut self, habit_id: &str, date: &str) {
        let dates = self.completions.entry(habit_id.to_string()).or_default();
        if !dates.iter().any(|d| d == date) {
            dates.push(date.to_string());
        }
    }

    pub fn completions(&self, habit_id: &str) -> &[String] {
        self.completions
            .get(habit_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_setting(&mut self, key: &str, value: Value) {
        self.settings.insert(key.to_string(), value);
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_habits_collection_fails_to_parse() {
        let json = r#"{"settings":{},"completions":{}}"#;
        assert!(serde_json::from_str::<Document>(json).is_err());
    }

    #[test]
    fn empty_habits_collection_parses() {
        let json = r#"{"habits":[]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.habits().is_empty());
    }

    #[test]
    fn unknown_sections_survive_roundtrip() {
        let json = r#"{"habits":[],"exercises":[{"id":"e1","sets":3}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["exercises"][0]["id"], "e1");
        assert_eq!(out["exercises"][0]["sets"], 3);
    }

    #[test]
    fn completion_dates_are_deduplicated() {
        let mut doc = Document::new();
        doc.add_habit(Habit::new("h1", "stretch"));
        doc.record_completion("h1", "2026-08-30");
        doc.record_completion("h1", "2026-08-30");

        assert_eq!(doc.completions("h1").len(), 1);
    }
}

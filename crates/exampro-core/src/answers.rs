//! The in-progress answers of one attempt.
//!
//! Keys are present only for questions the student has touched; absence
//! means unanswered, which is distinct from an empty answer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::AnswerValue;

/// Mutable mapping from question id to the student's current answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    entries: BTreeMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the answer for a question. The value is not
    /// checked against the question's variant.
    pub fn set(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.entries.insert(question_id.into(), value);
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.entries.get(question_id)
    }

    /// Add `option` to a selection, or remove it if already selected.
    ///
    /// A non-selection value under the same key is replaced.
    pub fn toggle(&mut self, question_id: &str, option: &str) {
        let entry = self
            .entries
            .entry(question_id.to_string())
            .or_insert_with(|| AnswerValue::Selection(Vec::new()));
        if !matches!(entry, AnswerValue::Selection(_)) {
            *entry = AnswerValue::Selection(Vec::new());
        }
        if let AnswerValue::Selection(selected) = entry {
            if let Some(pos) = selected.iter().position(|s| s == option) {
                selected.remove(pos);
            } else {
                selected.push(option.to_string());
            }
        }
    }

    /// Set one left→right choice of a matching answer, keeping the others.
    pub fn set_pair(&mut self, question_id: &str, left: &str, right: &str) {
        let entry = self
            .entries
            .entry(question_id.to_string())
            .or_insert_with(|| AnswerValue::Pairs(BTreeMap::new()));
        if !matches!(entry, AnswerValue::Pairs(_)) {
            *entry = AnswerValue::Pairs(BTreeMap::new());
        }
        if let AnswerValue::Pairs(pairs) = entry {
            pairs.insert(left.to_string(), right.to_string());
        }
    }

    /// Whether the question has a non-blank answer.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.entries.get(question_id).is_some_and(|v| !v.is_blank())
    }

    pub fn answered_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_blank()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take an immutable copy for scoring. Later writes to the store are
    /// not visible through the snapshot.
    pub fn snapshot(&self) -> AnswerSnapshot {
        AnswerSnapshot {
            entries: self.entries.clone(),
        }
    }
}

/// Frozen answers of an attempt, as scored and as persisted in a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSnapshot {
    entries: BTreeMap<String, AnswerValue>,
}

impl AnswerSnapshot {
    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.entries.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// src/attempt/answers.rs

use std::collections::BTreeMap;

use crate::models::answer::AnswerValue;

/// Mapping from question id to the user's current answer.
///
/// A pure mapping: values are not checked against the question type.
/// A missing key means the question is unanswered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    entries: BTreeMap<String, AnswerValue>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` for the question, replacing any previous answer.
    pub fn set(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.entries.insert(question_id.into(), value);
    }

    /// Returns the stored answer, or `None` when the question is unanswered.
    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.entries.get(question_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of all entries, ordered by question id.
    pub fn snapshot(&self) -> BTreeMap<String, AnswerValue> {
        self.entries.clone()
    }
}

// src/models/quiz.rs

use serde::{Deserialize, Serialize};

/// Quiz metadata as returned by the quiz API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizInfo {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Time limit in seconds. Zero means the attempt is untimed.
    #[serde(default, alias = "duration")]
    pub duration_seconds: u64,
}

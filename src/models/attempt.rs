// src/models/attempt.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    answer::AnswerValue,
    question::{CorrectAnswer, PublicQuestion},
    quiz::QuizInfo,
};

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    Idle,
    Loading,
    InProgress,
    Finished,
    Error,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Idle => "idle",
            AttemptStatus::Loading => "loading",
            AttemptStatus::InProgress => "in-progress",
            AttemptStatus::Finished => "finished",
            AttemptStatus::Error => "error",
        }
    }
}

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub correct: bool,
    /// Snapshot of the correct answer, kept for review after the attempt.
    pub correct_answer: CorrectAnswer,
}

/// The graded result of a finished attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: Uuid,
    pub quiz_id: String,
    pub quiz_title: String,
    /// Number of correctly answered questions.
    pub score: usize,
    pub total_questions: usize,
    /// Raw answers as stored. Absent keys are skipped questions.
    pub answers: BTreeMap<String, AnswerValue>,
    /// One entry per question, in quiz order.
    pub outcomes: Vec<QuestionOutcome>,
    pub elapsed_seconds: u64,
    /// Elapsed time rendered as `MM:SS` (or `H:MM:SS` for long quizzes).
    pub time_taken: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Acknowledgement returned by the backend after a result is submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAck {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of posting the result to the backend.
/// `NotConfigured` means results are kept locally only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SubmissionStatus {
    NotConfigured,
    Pending,
    Submitted { ack: SubmissionAck },
    Failed { reason: String },
}

/// Everything a page needs to render the current attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub attempt_id: Option<Uuid>,
    pub status: AttemptStatus,
    pub quiz: Option<QuizInfo>,
    pub current_question: Option<PublicQuestion>,
    pub current_index: Option<usize>,
    pub total_questions: usize,
    pub remaining_seconds: Option<u64>,
    pub remaining_formatted: Option<String>,
    pub answers: BTreeMap<String, AnswerValue>,
    pub result: Option<AttemptResult>,
    pub error: Option<String>,
    /// Set once the attempt has been graded.
    pub submission: Option<SubmissionStatus>,
}

impl AttemptSnapshot {
    /// View of a user who has no attempt yet.
    pub fn idle() -> Self {
        Self {
            attempt_id: None,
            status: AttemptStatus::Idle,
            quiz: None,
            current_question: None,
            current_index: None,
            total_questions: 0,
            remaining_seconds: None,
            remaining_formatted: None,
            answers: BTreeMap::new(),
            result: None,
            error: None,
            submission: None,
        }
    }
}

/// DTO for starting an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartAttemptRequest {
    #[validate(length(min = 1, max = 200))]
    pub quiz_id: String,
}

/// DTO for answering a question.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 200))]
    pub question_id: String,
    pub value: AnswerValue,
}

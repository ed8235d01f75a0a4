// src/attempt/review.rs

use serde::Serialize;

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    models::{
        answer::AnswerValue,
        attempt::AttemptResult,
        question::{CorrectAnswer, PublicQuestion, Question},
    },
};

/// How a question ended up in a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    Correct,
    /// Answered, but the answer did not match.
    Incorrect,
    /// No answer, a blank string or an empty selection.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub number: usize,
    pub question: PublicQuestion,
    pub status: ReviewStatus,
    pub given_answer: Option<AnswerValue>,
    pub correct_answer: CorrectAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub quiz_title: String,
    pub score: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub passed: bool,
    pub time_taken: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Score summary shown on the completion screen.
pub fn summarize(result: &AttemptResult) -> ResultSummary {
    let percentage = if result.total_questions == 0 {
        0.0
    } else {
        result.score as f64 / result.total_questions as f64 * 100.0
    };

    ResultSummary {
        quiz_title: result.quiz_title.clone(),
        score: result.score,
        total_questions: result.total_questions,
        percentage: percentage.round() as u32,
        passed: percentage >= PASSING_SCORE_PERCENTAGE,
        time_taken: result.time_taken.clone(),
        completed_at: result.completed_at,
    }
}

/// Builds the per-question review of a finished attempt.
///
/// Correctness comes from the graded outcomes; "skipped" versus "incorrect"
/// is decided from the raw answer snapshot. Questions without an outcome in
/// the result are left out.
pub fn review(questions: &[Question], result: &AttemptResult) -> Vec<ReviewItem> {
    questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let outcome = result
                .outcomes
                .iter()
                .find(|o| o.question_id == question.id)?;
            let given_answer = result.answers.get(&question.id).cloned();

            let status = if outcome.correct {
                ReviewStatus::Correct
            } else if given_answer.as_ref().is_none_or(AnswerValue::is_blank) {
                ReviewStatus::Skipped
            } else {
                ReviewStatus::Incorrect
            };

            Some(ReviewItem {
                number: index + 1,
                question: question.to_public(),
                status,
                given_answer,
                correct_answer: outcome.correct_answer.clone(),
            })
        })
        .collect()
}

// src/attempt/grading.rs

use std::collections::HashSet;

use validator::Validate;

use crate::{
    attempt::answers::AnswerStore,
    error::AppError,
    models::{
        answer::AnswerValue,
        attempt::QuestionOutcome,
        question::{Question, QuestionKind},
    },
};

/// Output of [`grade`]: the score plus one outcome per question, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub score: usize,
    pub total: usize,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Checks that every question can be graded and that ids are unique.
pub fn check_questions(questions: &[Question]) -> Result<(), AppError> {
    let mut seen_ids = HashSet::new();
    for question in questions {
        question.validate().map_err(|e| {
            AppError::BadRequest(format!("Malformed question '{}': {}", question.id, e))
        })?;
        if !seen_ids.insert(question.id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Malformed question set: duplicate question id '{}'",
                question.id
            )));
        }
    }
    Ok(())
}

/// Grades the answers against the questions.
///
/// Pure function: the same inputs always give the same `Grade`.
/// Unanswered questions are incorrect. Each question scores 0 or 1; there is
/// no partial credit. Fails only when [`check_questions`] does.
pub fn grade(questions: &[Question], answers: &AnswerStore) -> Result<Grade, AppError> {
    check_questions(questions)?;

    let mut outcomes = Vec::with_capacity(questions.len());
    for question in questions {
        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            correct: is_correct(&question.kind, answers.get(&question.id)),
            correct_answer: question.kind.correct_answer(),
        });
    }

    let score = outcomes.iter().filter(|o| o.correct).count();

    Ok(Grade {
        score,
        total: questions.len(),
        outcomes,
    })
}

/// Trim and case-fold for comparison.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn normalize_set(labels: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = labels.iter().map(|l| normalize(l)).collect();
    normalized.sort();
    normalized
}

fn is_correct(kind: &QuestionKind, answer: Option<&AnswerValue>) -> bool {
    let Some(answer) = answer else {
        return false;
    };

    match kind {
        QuestionKind::SingleChoice { correct, .. } => match answer {
            AnswerValue::Text(text) => {
                let given = normalize(text);
                !given.is_empty() && given == normalize(correct)
            }
            AnswerValue::Choices(_) => false,
        },
        QuestionKind::MultiChoice { correct, .. } => match answer {
            AnswerValue::Choices(choices) => {
                !choices.is_empty() && normalize_set(choices) == normalize_set(correct)
            }
            AnswerValue::Text(_) => false,
        },
        QuestionKind::ShortText { accepted } => match answer {
            AnswerValue::Text(text) => {
                let given = normalize(text);
                !given.is_empty() && accepted.iter().any(|a| normalize(a) == given)
            }
            AnswerValue::Choices(_) => false,
        },
    }
}
